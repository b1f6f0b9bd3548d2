//! Record decoder.
//!
//! Decodes one JSONL line into a [`DecodedRecord`]: the usage and metadata it
//! contributes to the session, plus where the record goes next ([`Route`]).
//!
//! Only a line that is not a JSON object of the expected shape is an error
//! ([`ParseError::InvalidJson`]); every field is optional and unparsable
//! timestamps degrade to `None`.

use crate::model::{
    AgentId, EntryUuid, Message, MessageFlags, MessageType, ParseError, SessionMetadata,
    TokenUsage,
};
use crate::parser::classify::{classify, RecordFlags};
use crate::parser::content::normalize_content;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// Record type string constants
const RECORD_TYPE_USER: &str = "user";
const RECORD_TYPE_ASSISTANT: &str = "assistant";
const RECORD_TYPE_SYSTEM: &str = "system";
const RECORD_TYPE_SUMMARY: &str = "summary";

const SUBTYPE_COMPACT_BOUNDARY: &str = "compact_boundary";

/// Raw JSON structure of one log line.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawRecord {
    #[serde(rename = "type")]
    record_type: Option<String>,
    subtype: Option<String>,
    timestamp: Option<String>,
    uuid: Option<String>,
    parent_uuid: Option<String>,
    logical_parent_uuid: Option<String>,
    is_compact_summary: Option<bool>,
    is_sidechain: Option<bool>,
    is_meta: Option<bool>,
    agent_id: Option<String>,
    message: Option<RawPayload>,
    summary: Option<String>,
    usage: Option<RawUsage>,
    slug: Option<String>,
    version: Option<String>,
    git_branch: Option<String>,
    cwd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPayload {
    content: Option<Value>,
    model: Option<String>,
    usage: Option<RawUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
}

impl From<RawUsage> for TokenUsage {
    fn from(raw: RawUsage) -> Self {
        TokenUsage {
            input_tokens: raw.input_tokens.unwrap_or(0),
            output_tokens: raw.output_tokens.unwrap_or(0),
            cache_read_input_tokens: raw.cache_read_input_tokens.unwrap_or(0),
            cache_creation_input_tokens: raw.cache_creation_input_tokens.unwrap_or(0),
        }
    }
}

/// Where a decoded record goes.
#[derive(Debug, Clone)]
pub enum Route {
    /// A `user` or `assistant` record, classified and normalized.
    Message(Box<Message>),
    /// A compaction boundary to register with the parent resolver.
    Boundary {
        /// Boundary record uuid (non-empty).
        uuid: String,
        /// Trimmed `logicalParentUuid`, when non-empty.
        logical_parent: Option<String>,
    },
    /// A `summary` record with non-empty (trimmed) text.
    Summary(String),
    /// Anything else: system events, empty summaries, unknown record types.
    Discarded,
}

/// One decoded line.
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    /// Usage counters the record carried, from either the top level or the
    /// nested message payload.
    pub usage: Option<TokenUsage>,
    /// Session metadata values on this record.
    pub metadata: SessionMetadata,
    /// Routing decision.
    pub route: Route,
}

/// Decode one line.
///
/// # Arguments
///
/// * `line` - Raw JSONL line (without the trailing newline)
/// * `line_number` - 1-based line number for error reporting
///
/// # Errors
///
/// Returns [`ParseError::InvalidJson`] when the line is not a JSON object of the
/// record shape (syntax error, non-object, or a field of the wrong JSON type).
pub fn decode_record(line: &str, line_number: usize) -> Result<DecodedRecord, ParseError> {
    let raw: RawRecord = serde_json::from_str(line).map_err(|e| ParseError::InvalidJson {
        line: line_number,
        message: e.to_string(),
    })?;
    Ok(route_record(raw))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn route_record(mut raw: RawRecord) -> DecodedRecord {
    let payload_usage = raw.message.as_mut().and_then(|m| m.usage.take());
    let usage = raw.usage.take().or(payload_usage).map(TokenUsage::from);

    let mut metadata = SessionMetadata::default();
    metadata.absorb(
        raw.slug.as_deref(),
        raw.version.as_deref(),
        raw.git_branch.as_deref(),
        raw.cwd.as_deref(),
    );

    let record_type = raw.record_type.clone().unwrap_or_default();
    let route = match record_type.as_str() {
        RECORD_TYPE_SYSTEM
            if raw.subtype.as_deref() == Some(SUBTYPE_COMPACT_BOUNDARY)
                && non_empty(&raw.uuid).is_some() =>
        {
            Route::Boundary {
                uuid: raw.uuid.clone().unwrap_or_default(),
                logical_parent: raw
                    .logical_parent_uuid
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            }
        }
        RECORD_TYPE_SUMMARY => match raw.summary.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Route::Summary(s.to_string()),
            _ => Route::Discarded,
        },
        RECORD_TYPE_USER | RECORD_TYPE_ASSISTANT => {
            Route::Message(Box::new(build_message(raw)))
        }
        _ => Route::Discarded,
    };

    DecodedRecord {
        usage,
        metadata,
        route,
    }
}

/// Parse an RFC 3339 timestamp (nanosecond precision accepted); `None` on failure.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn build_message(raw: RawRecord) -> Message {
    let record_type = raw.record_type.as_deref().unwrap_or_default();
    let message_type = MessageType::parse(record_type).unwrap_or(MessageType::User);

    let (payload_content, model) = match raw.message {
        Some(payload) => (payload.content, payload.model),
        None => (None, None),
    };
    let content = normalize_content(payload_content.as_ref());
    let raw_text = payload_content.as_ref().and_then(Value::as_str);

    let flags = MessageFlags {
        is_compacted: raw.is_compact_summary.unwrap_or(false),
        is_sidechain: raw.is_sidechain.unwrap_or(false),
        is_meta: raw.is_meta.unwrap_or(false),
    };
    let classification = classify(
        record_type,
        RecordFlags {
            is_compact_summary: flags.is_compacted,
            is_meta: flags.is_meta,
        },
        &content,
        raw_text,
    );

    Message::new(message_type, classification.kind)
        .with_uuid(EntryUuid::from_wire(raw.uuid))
        .with_parent(EntryUuid::from_wire(raw.parent_uuid))
        .with_subtype(raw.subtype.filter(|s| !s.is_empty()))
        .with_timestamp(raw.timestamp.as_deref().and_then(parse_timestamp))
        .with_flags(flags)
        .with_command(classification.command)
        .with_agent_id(raw.agent_id.and_then(|id| AgentId::new(id).ok()))
        .with_model(model.filter(|m| !m.is_empty()))
        .with_content(content)
}
