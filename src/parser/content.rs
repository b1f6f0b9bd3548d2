//! Content block normalizer.
//!
//! A record's content is either a plain string or an ordered list of tagged
//! objects. Everything downstream sees only `Vec<ContentBlock>`.
//!
//! # Degradation contract
//!
//! - missing or `null` content yields no blocks
//! - a plain string yields exactly one `Text` block (even when empty)
//! - list entries with an unrecognized or missing `type` are dropped
//! - a recognized entry whose fields have the wrong shape keeps the block with
//!   empty/default field values
//! - any other JSON shape (number, object, bool) yields no blocks

use crate::model::ContentBlock;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawBlock {
    Text {
        #[serde(default, deserialize_with = "lenient_string")]
        text: String,
    },
    Thinking {
        #[serde(default, deserialize_with = "lenient_string")]
        thinking: String,
    },
    ToolUse {
        #[serde(default, deserialize_with = "lenient_string")]
        id: String,
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default, deserialize_with = "lenient_string")]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default, deserialize_with = "lenient_bool")]
        is_error: bool,
    },
    Image {
        #[serde(default)]
        source: Value,
    },
    #[serde(other)]
    Unknown,
}

/// Accept any JSON value; non-strings become `""`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}

/// Accept any JSON value; non-booleans become `false`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

fn nested_str(source: &Value, key: &str) -> String {
    source
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl RawBlock {
    fn into_block(self) -> Option<ContentBlock> {
        let block = match self {
            RawBlock::Text { text } => ContentBlock::Text { text },
            RawBlock::Thinking { thinking } => ContentBlock::Thinking { text: thinking },
            RawBlock::ToolUse { id, name, input } => ContentBlock::ToolUse { id, name, input },
            RawBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            },
            RawBlock::Image { source } => ContentBlock::Image {
                media_type: nested_str(&source, "media_type"),
                data: nested_str(&source, "data"),
            },
            RawBlock::Unknown => return None,
        };
        Some(block)
    }
}

/// Normalize a raw content payload into content blocks.
///
/// Never fails; see the module docs for how odd shapes degrade.
pub fn normalize_content(content: Option<&Value>) -> Vec<ContentBlock> {
    match content {
        Some(Value::String(text)) => vec![ContentBlock::Text { text: text.clone() }],
        Some(Value::Array(items)) => items.iter().filter_map(normalize_block).collect(),
        _ => Vec::new(),
    }
}

fn normalize_block(item: &Value) -> Option<ContentBlock> {
    match RawBlock::deserialize(item) {
        Ok(raw) => raw.into_block(),
        Err(err) => {
            tracing::trace!(error = %err, "Dropping undecodable content block");
            None
        }
    }
}
