//! ccx: Claude Code session log toolkit.
//!
//! Parses append-only JSONL session logs into a message forest, classifies each
//! message, aggregates usage statistics, and follows files that are still being
//! written.
//!
//! - [`parser::parse_session`] runs a full parse into a [`model::Session`].
//! - [`source::spawn_tail`] streams appended lines; [`integration::decode_lines`]
//!   decodes them with the same pipeline.
//! - [`sections::SectionSplitter`] chunks large transcripts for deferred display.
//! - [`discovery`] lists projects and sessions under the assistant home.

pub mod config;
pub mod discovery;
pub mod integration;
pub mod logging;
pub mod model;
pub mod parser;
pub mod sections;
pub mod source;
