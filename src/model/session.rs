//! Session aggregate root.
//!
//! A [`Session`] owns every message of one log file in a flat arena (file order).
//! The forest is expressed through [`MessageId`] indices: each message lists its
//! children, and the session lists the roots. Walking the forest never recurses,
//! so deep conversations cannot overflow the stack.

use crate::model::{ContentBlock, EntryUuid, Message, MessageId, SessionId, SessionStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Summary used when a session has neither a summary record nor a typed prompt.
pub const NO_SUMMARY: &str = "(no summary)";

// ===== SessionMetadata =====

/// Session-wide metadata; the first non-empty value seen for each field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionMetadata {
    /// Human-readable session slug.
    pub slug: Option<String>,
    /// Producer version.
    pub version: Option<String>,
    /// Git branch at session start.
    pub git_branch: Option<String>,
    /// Working directory.
    pub cwd: Option<String>,
}

impl SessionMetadata {
    /// Fill each unset field from the record's values, ignoring empty strings.
    pub fn absorb(
        &mut self,
        slug: Option<&str>,
        version: Option<&str>,
        git_branch: Option<&str>,
        cwd: Option<&str>,
    ) {
        fill_once(&mut self.slug, slug);
        fill_once(&mut self.version, version);
        fill_once(&mut self.git_branch, git_branch);
        fill_once(&mut self.cwd, cwd);
    }

    /// Merge another metadata set in, keeping values already present.
    pub fn merge(&mut self, other: &SessionMetadata) {
        self.absorb(
            other.slug.as_deref(),
            other.version.as_deref(),
            other.git_branch.as_deref(),
            other.cwd.as_deref(),
        );
    }
}

fn fill_once(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            *slot = Some(v.to_string());
        }
    }
}

// ===== ParseDiagnostics =====

/// Non-fatal anomalies counted during a full parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Lines that were not decodable records.
    pub parse_errors: usize,
    /// Parent chains that hit the resolver's hop budget and resolved to a frontier.
    pub exhausted_parent_chains: usize,
}

// ===== Session =====

/// One parsed session file: a forest of messages plus derived data.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    path: PathBuf,
    summary: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    messages: Vec<Message>,
    roots: Vec<MessageId>,
    stats: SessionStats,
    metadata: SessionMetadata,
    diagnostics: ParseDiagnostics,
}

/// Everything the parser hands over to build a [`Session`].
pub(crate) struct SessionParts {
    pub id: SessionId,
    pub path: PathBuf,
    pub summary: String,
    pub messages: Vec<Message>,
    pub roots: Vec<MessageId>,
    pub stats: SessionStats,
    pub metadata: SessionMetadata,
    pub diagnostics: ParseDiagnostics,
}

impl Session {
    pub(crate) fn from_parts(parts: SessionParts) -> Self {
        let start_time = parts.messages.first().and_then(Message::timestamp);
        let end_time = parts.messages.last().and_then(Message::timestamp);
        Self {
            id: parts.id,
            path: parts.path,
            summary: parts.summary,
            start_time,
            end_time,
            messages: parts.messages,
            roots: parts.roots,
            stats: parts.stats,
            metadata: parts.metadata,
            diagnostics: parts.diagnostics,
        }
    }

    // ===== Accessors (read-only) =====

    /// Session id (file stem).
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Summary record text, or the fallback derived from the first prompt.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Timestamp of the first message in file order.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Timestamp of the last message in file order.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Aggregated counters.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// First-seen metadata.
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Non-fatal anomaly counts.
    pub fn diagnostics(&self) -> ParseDiagnostics {
        self.diagnostics
    }

    /// All messages in file order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when the session has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Look up a message by arena id.
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id.index())
    }

    /// Root ids, in file order.
    pub fn root_ids(&self) -> &[MessageId] {
        &self.roots
    }

    /// Root messages, in file order.
    pub fn root_messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.roots.iter().filter_map(move |id| self.message(*id))
    }

    /// Direct children of `message`, in file order.
    pub fn children<'a>(&'a self, message: &'a Message) -> impl Iterator<Item = &'a Message> + 'a {
        message
            .children()
            .iter()
            .filter_map(move |id| self.message(*id))
    }

    /// Find a message by uuid. When a uuid is duplicated the last occurrence wins,
    /// matching how the tree was linked.
    pub fn find(&self, uuid: &EntryUuid) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.uuid() == Some(uuid))
    }

    /// Depth-first pre-order walk of the forest: each root followed by its subtree.
    ///
    /// Iterative; every message appears exactly once.
    pub fn flatten(&self) -> Vec<&Message> {
        self.flatten_with_depth().into_iter().map(|(m, _)| m).collect()
    }

    /// Like [`flatten`](Self::flatten), with each message's depth (roots are 0).
    pub fn flatten_with_depth(&self) -> Vec<(&Message, usize)> {
        let mut out = Vec::with_capacity(self.messages.len());
        let mut stack: Vec<(MessageId, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(msg) = self.message(id) else {
                continue;
            };
            out.push((msg, depth));
            stack.extend(msg.children().iter().rev().map(|c| (*c, depth + 1)));
        }

        out
    }

    /// Map of tool-use id to its `tool_result` block.
    ///
    /// When several results share an id, the last one in file order wins.
    pub fn tool_results(&self) -> HashMap<&str, &ContentBlock> {
        self.messages
            .iter()
            .flat_map(|m| m.content())
            .filter_map(|block| match block {
                ContentBlock::ToolResult { tool_use_id, .. } => {
                    Some((tool_use_id.as_str(), block))
                }
                _ => None,
            })
            .collect()
    }

    /// Serializable summary of the session without message bodies.
    pub fn overview(&self) -> SessionOverview<'_> {
        SessionOverview {
            id: &self.id,
            path: &self.path,
            summary: &self.summary,
            start_time: self.start_time,
            end_time: self.end_time,
            messages: self.messages.len(),
            roots: self.roots.len(),
            stats: &self.stats,
            metadata: &self.metadata,
            diagnostics: self.diagnostics,
        }
    }
}

/// Borrowed, serializable view of a session's header data.
#[derive(Debug, Serialize)]
pub struct SessionOverview<'a> {
    /// Session id.
    pub id: &'a SessionId,
    /// Source file.
    pub path: &'a Path,
    /// Session summary.
    pub summary: &'a str,
    /// First message timestamp.
    pub start_time: Option<DateTime<Utc>>,
    /// Last message timestamp.
    pub end_time: Option<DateTime<Utc>>,
    /// Total messages.
    pub messages: usize,
    /// Root messages.
    pub roots: usize,
    /// Counters.
    pub stats: &'a SessionStats,
    /// Metadata.
    pub metadata: &'a SessionMetadata,
    /// Anomaly counts.
    pub diagnostics: ParseDiagnostics,
}

/// Summary fallback: first line of the first non-empty text block of the first
/// typed prompt, trimmed. [`NO_SUMMARY`] when there is none.
pub(crate) fn fallback_summary(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.kind() == crate::model::MessageKind::UserPrompt)
        .find_map(Message::first_text)
        .map(|text| {
            let text = text.trim();
            text.lines().next().unwrap_or(text).trim_end().to_string()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_SUMMARY.to_string())
}
