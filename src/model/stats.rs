//! Session statistics.
//!
//! Pure fold over the flat, file-order message list plus the token totals the
//! decoder accumulated. Recomputed on every parse.

use crate::model::{Message, MessageKind, TokenUsage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

// ===== SessionStats =====

/// Aggregated counters for one session.
///
/// # Invariants
///
/// - `message_count` counts only conversational turns (`UserPrompt` and `Assistant`)
/// - `user_prompts <= message_count`
/// - `tool_calls` equals the sum of the values in `tool_counts`
/// - `usage` covers every record that carried usage data, including ones that never
///   became messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    /// Conversational turns: `UserPrompt` plus `Assistant` messages.
    pub message_count: usize,

    /// Messages the user actually typed.
    pub user_prompts: usize,

    /// `tool_use` blocks across all messages, regardless of kind.
    pub tool_calls: usize,

    /// Messages carrying compacted context (`isCompactSummary`).
    pub continuations: usize,

    /// Messages on a sub-agent branch.
    pub agent_sidechains: usize,

    /// Token totals for the whole session.
    pub usage: TokenUsage,

    /// Seconds between the first and last message timestamps in file order, with
    /// millisecond precision.
    ///
    /// Zero when either endpoint has no timestamp. File order is not sorted, so an
    /// out-of-order log can produce a negative value.
    pub duration_seconds: f64,

    /// `tool_use` invocations grouped by tool name.
    pub tool_counts: BTreeMap<String, usize>,
}

impl SessionStats {
    /// Fold a flat message list into counters.
    ///
    /// # Arguments
    ///
    /// * `messages` - Messages in file order (pre-tree)
    /// * `usage` - Token totals accumulated by the decoder
    pub fn from_messages(messages: &[Message], usage: TokenUsage) -> Self {
        let mut stats = SessionStats {
            usage,
            ..Default::default()
        };

        for msg in messages {
            stats.record(msg);
        }

        let first = messages.first().and_then(Message::timestamp);
        let last = messages.last().and_then(Message::timestamp);
        stats.duration_seconds = duration_between(first, last);

        stats
    }

    fn record(&mut self, msg: &Message) {
        if msg.kind().is_turn() {
            self.message_count += 1;
        }
        if msg.kind() == MessageKind::UserPrompt {
            self.user_prompts += 1;
        }
        if msg.is_compacted() {
            self.continuations += 1;
        }
        if msg.is_sidechain() {
            self.agent_sidechains += 1;
        }

        for block in msg.content() {
            if let crate::model::ContentBlock::ToolUse { name, .. } = block {
                self.tool_calls += 1;
                *self.tool_counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
    }
}

/// Seconds from `start` to `end`, or 0 if either is missing.
pub(crate) fn duration_between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> f64 {
    match (start, end) {
        (Some(s), Some(e)) => (e - s).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    }
}
