//! Error types for ccx.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level binary error wrapping all domain-specific failures
//!   - [`SessionError`] - A full session parse that could not complete
//!     - [`InputError`] - Session file missing or unreadable
//!     - [`ParseError`] - Malformed record, or a line too long to advance past
//!   - [`ConfigError`](crate::config::ConfigError) - Config file unreadable or invalid
//!   - [`LoggingError`](crate::logging::LoggingError) - Tracing setup failures
//!
//! # Error Recovery Strategy
//!
//! Record-level problems are **non-fatal**: a malformed JSONL line yields a
//! [`ParseError::InvalidJson`] from the decoder, which the full parse counts and skips.
//! Only failures that stop the stream from advancing are fatal for a file: the file cannot
//! be opened or read ([`InputError`]), or a single line exceeds the maximum buffer size
//! ([`ParseError::LineTooLong`]). Live tailing never surfaces I/O errors; it retries on the
//! next tick.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for the `ccx` binary.
///
/// Library operations return the narrower types below; this exists so `main` can
/// propagate every failure with `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Parsing a session file failed.
    #[error("Failed to parse session: {0}")]
    Session(#[from] SessionError),

    /// Loading the config file failed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Installing the tracing subscriber failed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Failed to read input outside of a session parse (e.g. project discovery).
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A full session parse that aborted.
///
/// Callers decide what to do with it: bulk discovery skips the session,
/// direct access surfaces the failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session file could not be opened or read.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The stream could not be advanced (line over the size limit).
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Input(InputError::Io(err))
    }
}

/// Errors encountered when reading session files.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified session file does not exist at the given path.
    ///
    /// Distinct from [`InputError::Io`] so callers can tell "wrong path" apart from
    /// permission or disk problems.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ccx::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The filesystem path that was not found.
        path: PathBuf,
    },

    /// Generic I/O error reading from the file.
    ///
    /// The `#[from]` attribute enables automatic conversion from `std::io::Error`:
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use ccx::model::error::InputError;
    ///
    /// fn open_log(path: &str) -> Result<File, InputError> {
    ///     Ok(File::open(path)?)
    /// }
    /// ```
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InputError {
    /// Classify an `open` failure, mapping `NotFound` to [`InputError::FileNotFound`].
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            InputError::FileNotFound { path: path.into() }
        } else {
            InputError::Io(err)
        }
    }
}

/// Errors encountered when decoding JSONL session records.
///
/// All variants include the 1-based `line` so users can jump to the offending line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A log line is not a JSON object matching the record shape.
    ///
    /// Recoverable: the full parse counts it and moves on to the next line.
    ///
    /// **Why `message` is `String` not `serde_json::Error`**: the parser error message is
    /// all callers need; carrying the full error would tie the API to `serde_json`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ccx::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "unexpected character '}' at position 15".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// The 1-based line number in the JSONL file where decoding failed.
        line: usize,
        /// The decoder's description of what went wrong.
        message: String,
    },

    /// A single line exceeded the maximum buffer size.
    ///
    /// Fatal for the parse: the stream cannot be safely advanced past a line that
    /// cannot be buffered.
    #[error("Line {line} exceeds the maximum line length of {limit} bytes")]
    LineTooLong {
        /// The 1-based line number of the oversized line.
        line: usize,
        /// The configured limit in bytes.
        limit: usize,
    },
}
