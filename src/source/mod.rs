//! Log input sources.
//!
//! Session files are append-only and may still be growing while they are read.
//! Full parses read them once through [`crate::parser::parse_session`]; this module
//! follows them afterwards:
//! - [`LineTailer`]: single-file tick state machine (bounded reads, partial-line carry)
//! - [`spawn_tail`]: fixed-interval polling thread delivering lines over a channel
//!
//! Polling is used instead of filesystem notifications so behavior is the same on
//! every platform; the interval is configurable.

pub mod tail;

pub use tail::{
    spawn_tail, LineTailer, TailOptions, TailStart, TailState, TailSubscription,
    DEFAULT_MAX_CHUNK_BYTES, DEFAULT_POLL_INTERVAL,
};
