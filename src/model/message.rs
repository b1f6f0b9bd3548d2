//! Message types for Claude Code session logs.
//!
//! A [`Message`] is one classified, parent-resolved conversational unit.
//! Its content is always a uniform [`ContentBlock`] sequence, whatever shape the
//! wire format used.

use crate::model::{AgentId, EntryUuid};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ===== MessageType =====

/// Record type a message was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// `"user"` record (prompts, tool results, commands, meta, compaction carriers)
    User,
    /// `"assistant"` record
    Assistant,
    /// `"system"` record
    System,
}

impl MessageType {
    /// Parse the wire `type` tag. Returns `None` for record types that never become messages.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

// ===== MessageKind =====

/// Semantic classification of a message.
///
/// Assigned once by the classifier; `Unknown` is the designed fallback and is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Text the user actually typed
    UserPrompt,
    /// Tool execution result fed back to the model
    ToolResult,
    /// Slash command invocation (`/init`, `/compact`, ...)
    Command,
    /// Injected instructions flagged `isMeta`
    Meta,
    /// Carrier of compacted context after a compaction event
    CompactSummary,
    /// Model response
    Assistant,
    /// System event
    System,
    /// Anything else
    Unknown,
}

impl MessageKind {
    /// Whether this kind counts as a conversational turn.
    pub fn is_turn(&self) -> bool {
        matches!(self, Self::UserPrompt | Self::Assistant)
    }

    /// Snake-case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserPrompt => "user_prompt",
            Self::ToolResult => "tool_result",
            Self::Command => "command",
            Self::Meta => "meta",
            Self::CompactSummary => "compact_summary",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Unknown => "unknown",
        }
    }
}

// ===== ContentBlock =====

/// Tag of a [`ContentBlock`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Literal text
    Text,
    /// Extended-thinking text
    Thinking,
    /// Tool invocation
    ToolUse,
    /// Tool outcome
    ToolResult,
    /// Inline image
    Image,
}

/// One normalized unit of message content.
///
/// `Text` and `Thinking` both carry plain text; they stay distinct variants so
/// consumers can still tell visible output from reasoning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Literal text
    Text {
        /// Markdown-ish text as written
        text: String,
    },
    /// Extended thinking (model reasoning)
    Thinking {
        /// Reasoning text
        text: String,
    },
    /// Tool invocation by the assistant
    ToolUse {
        /// Identifier linking this call to its result
        id: String,
        /// Tool name (Read, Bash, ...)
        name: String,
        /// Tool-specific parameters
        input: serde_json::Value,
    },
    /// Result returned from a tool execution
    ToolResult {
        /// Identifier of the originating `ToolUse`
        tool_use_id: String,
        /// Result payload, string or structured
        content: serde_json::Value,
        /// Whether the tool reported failure
        is_error: bool,
    },
    /// Base64 image payload
    Image {
        /// MIME type, e.g. `image/png`
        media_type: String,
        /// Encoded image data
        data: String,
    },
}

impl ContentBlock {
    /// The block's tag.
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text { .. } => BlockType::Text,
            Self::Thinking { .. } => BlockType::Thinking,
            Self::ToolUse { .. } => BlockType::ToolUse,
            Self::ToolResult { .. } => BlockType::ToolResult,
            Self::Image { .. } => BlockType::Image,
        }
    }

    /// Text payload of `Text` and `Thinking` blocks.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text } | Self::Thinking { text } => Some(text),
            _ => None,
        }
    }

    /// Tool-use id for `ToolUse` and `ToolResult` blocks.
    pub fn tool_id(&self) -> Option<&str> {
        match self {
            Self::ToolUse { id, .. } => Some(id),
            Self::ToolResult { tool_use_id, .. } => Some(tool_use_id),
            _ => None,
        }
    }
}

// ===== SlashCommand =====

/// Command name and arguments extracted from a `<command-...>` message.
///
/// Either part is empty when its delimiters are missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlashCommand {
    /// e.g. `/compact`
    pub name: String,
    /// Free-form arguments after the command
    pub args: String,
}

// ===== MessageFlags =====

/// Boolean flags carried over from the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageFlags {
    /// Record carried `isCompactSummary`
    pub is_compacted: bool,
    /// Record belongs to a sub-agent branch
    pub is_sidechain: bool,
    /// Record carried `isMeta`
    pub is_meta: bool,
}

// ===== MessageId =====

/// Index of a message in its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub(crate) usize);

impl MessageId {
    /// Position in file order.
    pub fn index(&self) -> usize {
        self.0
    }
}

// ===== Message =====

/// A classified, parent-resolved conversational unit.
///
/// Built once per decoded record. The parent reference is rewritten once by the
/// logical-parent resolver and children are attached once by the tree builder;
/// after that the owning [`Session`](crate::model::Session) exposes it read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    uuid: Option<EntryUuid>,
    parent_uuid: Option<EntryUuid>,
    #[serde(rename = "type")]
    message_type: MessageType,
    kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtype: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    content: Vec<ContentBlock>,
    children: Vec<MessageId>,
    #[serde(flatten)]
    flags: MessageFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<SlashCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl Message {
    /// Create a message with no identity, content, or flags.
    ///
    /// Use the `with_*` builders to fill in the rest.
    pub fn new(message_type: MessageType, kind: MessageKind) -> Self {
        Self {
            uuid: None,
            parent_uuid: None,
            message_type,
            kind,
            subtype: None,
            timestamp: None,
            content: Vec::new(),
            children: Vec::new(),
            flags: MessageFlags::default(),
            command: None,
            agent_id: None,
            model: None,
        }
    }

    // ===== Builders =====

    /// Set the message uuid (builder pattern).
    pub fn with_uuid(mut self, uuid: Option<EntryUuid>) -> Self {
        self.uuid = uuid;
        self
    }

    /// Set the raw parent uuid (builder pattern).
    pub fn with_parent(mut self, parent: Option<EntryUuid>) -> Self {
        self.parent_uuid = parent;
        self
    }

    /// Set the content blocks (builder pattern).
    pub fn with_content(mut self, content: Vec<ContentBlock>) -> Self {
        self.content = content;
        self
    }

    /// Set the flags (builder pattern).
    pub fn with_flags(mut self, flags: MessageFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the timestamp (builder pattern).
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the extracted slash command (builder pattern).
    pub fn with_command(mut self, command: Option<SlashCommand>) -> Self {
        self.command = command;
        self
    }

    /// Set the record subtype (builder pattern).
    pub fn with_subtype(mut self, subtype: Option<String>) -> Self {
        self.subtype = subtype;
        self
    }

    /// Set the sub-agent id (builder pattern).
    pub fn with_agent_id(mut self, agent_id: Option<AgentId>) -> Self {
        self.agent_id = agent_id;
        self
    }

    /// Set the model id (builder pattern).
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    // ===== Crate-internal mutation =====

    pub(crate) fn set_parent_uuid(&mut self, parent: Option<EntryUuid>) {
        self.parent_uuid = parent;
    }

    pub(crate) fn push_child(&mut self, child: MessageId) {
        self.children.push(child);
    }

    // ===== Accessors (read-only) =====

    /// Message uuid; `None` when the record had none.
    pub fn uuid(&self) -> Option<&EntryUuid> {
        self.uuid.as_ref()
    }

    /// Parent uuid after logical-parent resolution; `None` for roots.
    pub fn parent_uuid(&self) -> Option<&EntryUuid> {
        self.parent_uuid.as_ref()
    }

    /// Record type.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Semantic kind.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Record subtype, if any.
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Wall-clock timestamp; `None` when missing or unparsable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Normalized content blocks.
    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    /// Direct children, in file order.
    pub fn children(&self) -> &[MessageId] {
        &self.children
    }

    /// Record flags.
    pub fn flags(&self) -> MessageFlags {
        self.flags
    }

    /// Carries compacted context.
    pub fn is_compacted(&self) -> bool {
        self.flags.is_compacted
    }

    /// Belongs to a sub-agent branch.
    pub fn is_sidechain(&self) -> bool {
        self.flags.is_sidechain
    }

    /// Flagged as meta instructions.
    pub fn is_meta(&self) -> bool {
        self.flags.is_meta
    }

    /// Whether a slash command was recognised.
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }

    /// Extracted slash command, if this is a command message.
    pub fn command(&self) -> Option<&SlashCommand> {
        self.command.as_ref()
    }

    /// Command name, or `""` for non-command messages.
    pub fn command_name(&self) -> &str {
        self.command.as_ref().map_or("", |c| c.name.as_str())
    }

    /// Command arguments, or `""` for non-command messages.
    pub fn command_args(&self) -> &str {
        self.command.as_ref().map_or("", |c| c.args.as_str())
    }

    /// Sub-agent id, if the record came from one.
    pub fn agent_id(&self) -> Option<&AgentId> {
        self.agent_id.as_ref()
    }

    /// Model id for assistant messages.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Number of `tool_use` blocks in this message.
    pub fn tool_use_count(&self) -> usize {
        self.content
            .iter()
            .filter(|b| b.block_type() == BlockType::ToolUse)
            .count()
    }

    /// First non-empty `text` block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|b| match b {
            ContentBlock::Text { text } if !text.is_empty() => Some(text.as_str()),
            _ => None,
        })
    }
}
