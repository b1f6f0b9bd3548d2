//! JSONL parser for Claude Code session logs.
//!
//! A full parse runs in two passes. The first pass streams lines through the
//! record decoder, which normalizes content, classifies messages, accumulates
//! usage and metadata, and registers compaction boundaries. The second pass
//! resolves logical parents, builds the message forest, and folds stats.
//!
//! The decoder, normalizer, and classifier are also usable one line at a time
//! for live tailing (see [`crate::integration`]).

pub mod classify;
pub mod content;
pub mod decode;
pub mod resolve;
pub mod session;
pub mod tree;

pub use classify::{
    classify, extract_command_args, extract_command_name, Classification, RecordFlags,
};
pub use content::normalize_content;
pub use decode::{decode_record, parse_timestamp, DecodedRecord, Route};
pub use resolve::{resolve_parents, LogicalParents, Resolution, MAX_HOPS};
pub use session::{
    parse_reader, parse_session, session_id_from_path, ParseOptions, RecordAccumulator,
    DEFAULT_MAX_LINE_BYTES,
};
pub use tree::build_tree;
