//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::Serialize;
use std::fmt;

/// Unique identifier for a message within a session.
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryUuid(String);

impl EntryUuid {
    /// Smart constructor: validates non-empty UUID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidUuid> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidUuid::Empty);
        }
        Ok(Self(raw))
    }

    /// Lenient constructor for wire values: empty or missing becomes `None`.
    pub fn from_wire(raw: Option<String>) -> Option<Self> {
        raw.and_then(|s| Self::new(s).ok())
    }

    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier, derived from the session file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Smart constructor: validates non-empty session ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        Ok(Self(raw))
    }

    /// Placeholder for sources without a usable name.
    pub fn unknown() -> Self {
        Self(UNKNOWN_SESSION_ID.to_string())
    }

    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) const UNKNOWN_SESSION_ID: &str = "unknown-session";

/// Subagent identifier (e.g., "a7b2877").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Smart constructor: validates non-empty agent ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidAgentId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidAgentId::Empty);
        }
        Ok(Self(raw))
    }

    /// The raw identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejected [`EntryUuid`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUuid {
    /// The input was empty.
    #[error("UUID cannot be empty")]
    Empty,
}

/// Rejected [`SessionId`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSessionId {
    /// The input was empty.
    #[error("Session ID cannot be empty")]
    Empty,
}

/// Rejected [`AgentId`] input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAgentId {
    /// The input was empty.
    #[error("Agent ID cannot be empty")]
    Empty,
}

// ===== Tests =====
