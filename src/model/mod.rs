//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod identifiers;
pub mod message;
pub mod session;
pub mod stats;
pub mod usage;

// Re-export for convenience
pub use error::{AppError, InputError, ParseError, SessionError};
pub use identifiers::{
    AgentId, EntryUuid, InvalidAgentId, InvalidSessionId, InvalidUuid, SessionId,
};
pub use message::{
    BlockType, ContentBlock, Message, MessageFlags, MessageId, MessageKind, MessageType,
    SlashCommand,
};
pub use session::{ParseDiagnostics, Session, SessionMetadata, SessionOverview, NO_SUMMARY};
pub use stats::SessionStats;
pub use usage::TokenUsage;
