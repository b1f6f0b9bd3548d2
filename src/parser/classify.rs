//! Message classifier.
//!
//! Pure function from record type, flags, and content shape to a [`MessageKind`].
//! The first matching rule wins:
//!
//! 1. `assistant` record → `Assistant`
//! 2. `system` record → `System`
//! 3. `user` record:
//!    - `isCompactSummary` → `CompactSummary`
//!    - `isMeta` → `Meta`
//!    - first block is `tool_result` → `ToolResult`
//!    - first block is `text` starting with `<command-` → `Command`
//!    - raw string content starting with `<command-` → `Command`
//!    - otherwise → `UserPrompt`
//! 4. anything else → `Unknown`

use crate::model::{ContentBlock, MessageKind, SlashCommand};

const COMMAND_PREFIX: &str = "<command-";
const COMMAND_NAME_OPEN: &str = "<command-name>";
const COMMAND_NAME_CLOSE: &str = "</command-name>";
const COMMAND_ARGS_OPEN: &str = "<command-args>";
const COMMAND_ARGS_CLOSE: &str = "</command-args>";

/// Record flags the classifier looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFlags {
    /// `isCompactSummary`
    pub is_compact_summary: bool,
    /// `isMeta`
    pub is_meta: bool,
}

/// Classifier output: the kind, plus the slash command when the kind is `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Assigned kind.
    pub kind: MessageKind,
    /// Extracted command; `Some` exactly when `kind` is `Command`.
    pub command: Option<SlashCommand>,
}

impl Classification {
    fn kind(kind: MessageKind) -> Self {
        Self {
            kind,
            command: None,
        }
    }

    fn command(text: &str) -> Self {
        Self {
            kind: MessageKind::Command,
            command: Some(SlashCommand {
                name: extract_command_name(text),
                args: extract_command_args(text),
            }),
        }
    }
}

/// Classify a record.
///
/// # Arguments
///
/// * `record_type` - Wire `type` tag (`user`, `assistant`, `system`, ...)
/// * `flags` - `isCompactSummary` / `isMeta`
/// * `content` - Normalized content blocks
/// * `raw_text` - Original content when it was a plain string
///
/// Idempotent, never fails; unmatched input is `Unknown`.
pub fn classify(
    record_type: &str,
    flags: RecordFlags,
    content: &[ContentBlock],
    raw_text: Option<&str>,
) -> Classification {
    match record_type {
        "assistant" => Classification::kind(MessageKind::Assistant),
        "system" => Classification::kind(MessageKind::System),
        "user" => classify_user(flags, content, raw_text),
        _ => Classification::kind(MessageKind::Unknown),
    }
}

fn classify_user(
    flags: RecordFlags,
    content: &[ContentBlock],
    raw_text: Option<&str>,
) -> Classification {
    if flags.is_compact_summary {
        return Classification::kind(MessageKind::CompactSummary);
    }
    if flags.is_meta {
        return Classification::kind(MessageKind::Meta);
    }

    match content.first() {
        Some(ContentBlock::ToolResult { .. }) => {
            return Classification::kind(MessageKind::ToolResult);
        }
        Some(ContentBlock::Text { text }) if text.starts_with(COMMAND_PREFIX) => {
            return Classification::command(text);
        }
        _ => {}
    }

    if let Some(raw) = raw_text.filter(|raw| raw.starts_with(COMMAND_PREFIX)) {
        return Classification::command(raw);
    }

    Classification::kind(MessageKind::UserPrompt)
}

/// Text between `<command-name>` and `</command-name>`, trimmed.
///
/// Returns `""` when either delimiter is missing.
pub fn extract_command_name(text: &str) -> String {
    between(text, COMMAND_NAME_OPEN, COMMAND_NAME_CLOSE)
}

/// Text between `<command-args>` and `</command-args>`, trimmed.
///
/// Returns `""` when either delimiter is missing.
pub fn extract_command_args(text: &str) -> String {
    between(text, COMMAND_ARGS_OPEN, COMMAND_ARGS_CLOSE)
}

fn between(text: &str, open: &str, close: &str) -> String {
    let Some(start) = text.find(open).map(|i| i + open.len()) else {
        return String::new();
    };
    let rest = &text[start..];
    match rest.find(close) {
        Some(end) => rest[..end].trim().to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> ContentBlock {
        ContentBlock::Text { text: s.into() }
    }

    fn tool_result() -> ContentBlock {
        ContentBlock::ToolResult {
            tool_use_id: "toolu_1".into(),
            content: json!("ok"),
            is_error: false,
        }
    }

    fn user(flags: RecordFlags, content: &[ContentBlock]) -> MessageKind {
        classify("user", flags, content, None).kind
    }

    #[test]
    fn record_type_decides_assistant_and_system() {
        let flags = RecordFlags {
            is_compact_summary: true,
            is_meta: true,
        };
        assert_eq!(
            classify("assistant", flags, &[tool_result()], None).kind,
            MessageKind::Assistant
        );
        assert_eq!(classify("system", flags, &[], None).kind, MessageKind::System);
    }

    #[test]
    fn unrecognized_record_type_is_unknown() {
        assert_eq!(
            classify("summary", RecordFlags::default(), &[text("x")], None).kind,
            MessageKind::Unknown
        );
        assert_eq!(
            classify("", RecordFlags::default(), &[], None).kind,
            MessageKind::Unknown
        );
    }

    #[test]
    fn compact_summary_flag_wins_over_any_content_shape() {
        let flags = RecordFlags {
            is_compact_summary: true,
            is_meta: true,
        };
        for content in [
            vec![],
            vec![tool_result()],
            vec![text("<command-name>/x</command-name>")],
            vec![text("plain")],
        ] {
            assert_eq!(
                user(flags, &content),
                MessageKind::CompactSummary,
                "content {:?}",
                content
            );
        }
    }

    #[test]
    fn meta_flag_wins_over_tool_result_first_block() {
        let flags = RecordFlags {
            is_meta: true,
            ..Default::default()
        };
        assert_eq!(user(flags, &[tool_result()]), MessageKind::Meta);
    }

    #[test]
    fn tool_result_first_block_is_tool_result() {
        assert_eq!(
            user(RecordFlags::default(), &[tool_result(), text("trailing")]),
            MessageKind::ToolResult
        );
    }

    #[test]
    fn tool_result_later_in_list_does_not_count() {
        assert_eq!(
            user(RecordFlags::default(), &[text("look"), tool_result()]),
            MessageKind::UserPrompt
        );
    }

    #[test]
    fn command_in_first_text_block_extracts_name_and_args() {
        let body = "<command-message>compact</command-message>\n\
                    <command-name> /compact </command-name>\n\
                    <command-args>keep the api notes</command-args>";
        let c = classify("user", RecordFlags::default(), &[text(body)], None);
        assert_eq!(c.kind, MessageKind::Command);
        assert_eq!(
            c.command,
            Some(SlashCommand {
                name: "/compact".into(),
                args: "keep the api notes".into(),
            })
        );
    }

    #[test]
    fn command_from_raw_string_content() {
        let raw = "<command-name>/init</command-name>";
        let c = classify(
            "user",
            RecordFlags::default(),
            &[ContentBlock::Thinking { text: raw.into() }],
            Some(raw),
        );
        assert_eq!(c.kind, MessageKind::Command);
        assert_eq!(c.command.map(|c| c.name), Some("/init".to_string()));
    }

    #[test]
    fn missing_delimiters_yield_empty_strings() {
        let c = classify(
            "user",
            RecordFlags::default(),
            &[text("<command-name>/resume")],
            None,
        );
        assert_eq!(c.kind, MessageKind::Command);
        let cmd = c.command.unwrap();
        assert_eq!(cmd.name, "", "unclosed name");
        assert_eq!(cmd.args, "", "absent args");
    }

    #[test]
    fn plain_text_is_user_prompt() {
        let c = classify(
            "user",
            RecordFlags::default(),
            &[text("Create a hello world function")],
            None,
        );
        assert_eq!(c.kind, MessageKind::UserPrompt);
        assert!(c.command.is_none());
    }

    #[test]
    fn empty_user_content_is_user_prompt() {
        assert_eq!(user(RecordFlags::default(), &[]), MessageKind::UserPrompt);
    }

    #[test]
    fn classification_is_idempotent() {
        let content = [text("<command-name>/x</command-name>")];
        let a = classify("user", RecordFlags::default(), &content, None);
        let b = classify("user", RecordFlags::default(), &content, None);
        assert_eq!(a, b);
    }
}
