//! Full-session parse.
//!
//! Streams a session file line by line through the decoder, then runs the
//! second pass: logical parent resolution, tree building, and stats.
//! Memory is bounded by the largest single line, never the file size.

use crate::model::session::{fallback_summary, SessionParts};
use crate::model::{
    InputError, Message, ParseDiagnostics, ParseError, Session, SessionError, SessionId,
    SessionMetadata, SessionStats, TokenUsage,
};
use crate::parser::decode::{decode_record, DecodedRecord, Route};
use crate::parser::resolve::{resolve_parents, LogicalParents};
use crate::parser::tree::build_tree;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default maximum line length: 10 MiB.
pub const DEFAULT_MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Knobs for a full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Longest line accepted; a longer line aborts the parse with
    /// [`ParseError::LineTooLong`].
    pub max_line_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

// ===== RecordAccumulator =====

/// First-pass state: everything gathered from decoded records before the
/// second pass can run.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    messages: Vec<Message>,
    parents: LogicalParents,
    usage: TokenUsage,
    metadata: SessionMetadata,
    summary: Option<String>,
    diagnostics: ParseDiagnostics,
}

impl RecordAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded record in.
    pub fn accept(&mut self, record: DecodedRecord) {
        if let Some(usage) = record.usage {
            self.usage += usage;
        }
        self.metadata.merge(&record.metadata);

        match record.route {
            Route::Message(msg) => self.messages.push(*msg),
            Route::Boundary {
                uuid,
                logical_parent,
            } => self.parents.register(&uuid, logical_parent.as_deref()),
            Route::Summary(text) => {
                if self.summary.is_none() {
                    self.summary = Some(text);
                }
            }
            Route::Discarded => {}
        }
    }

    /// Count a line that could not be decoded.
    pub fn record_error(&mut self) {
        self.diagnostics.parse_errors += 1;
    }

    /// Messages gathered so far, in file order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run the second pass and build the session.
    pub fn finish(mut self, id: SessionId, path: PathBuf) -> Session {
        self.diagnostics.exhausted_parent_chains =
            resolve_parents(&mut self.messages, &self.parents);

        let roots = build_tree(&mut self.messages);
        let stats = SessionStats::from_messages(&self.messages, self.usage);
        let summary = self
            .summary
            .unwrap_or_else(|| fallback_summary(&self.messages));

        Session::from_parts(SessionParts {
            id,
            path,
            summary,
            messages: self.messages,
            roots,
            stats,
            metadata: self.metadata,
            diagnostics: self.diagnostics,
        })
    }
}

// ===== Parsing =====

/// Parse a session file.
///
/// The session id is the file stem (`abc.jsonl` → `abc`).
///
/// # Errors
///
/// - [`InputError::FileNotFound`] / [`InputError::Io`] when the file cannot be opened or read
/// - [`ParseError::LineTooLong`] when a line exceeds `options.max_line_bytes`
///
/// Malformed lines are not errors; they are counted in the session diagnostics.
pub fn parse_session(path: &Path, options: &ParseOptions) -> Result<Session, SessionError> {
    let file = File::open(path).map_err(|e| InputError::from_open(path, e))?;
    parse_reader(
        BufReader::new(file),
        session_id_from_path(path),
        path.to_path_buf(),
        options,
    )
}

/// Parse a session from any buffered reader.
///
/// # Errors
///
/// Read failures and over-long lines; see [`parse_session`].
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    id: SessionId,
    path: PathBuf,
    options: &ParseOptions,
) -> Result<Session, SessionError> {
    let mut acc = RecordAccumulator::new();
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    while read_bounded_line(&mut reader, &mut buf, options.max_line_bytes, line_number + 1)? {
        line_number += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            debug!(line = line_number, "Skipping line with invalid UTF-8");
            acc.record_error();
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        match decode_record(line, line_number) {
            Ok(record) => acc.accept(record),
            Err(err) => {
                debug!(line = line_number, error = %err, "Skipping malformed record");
                acc.record_error();
            }
        }
    }

    let session = acc.finish(id, path);
    info!(
        session = %session.id(),
        lines = line_number,
        messages = session.len(),
        roots = session.root_ids().len(),
        parse_errors = session.diagnostics().parse_errors,
        exhausted_parent_chains = session.diagnostics().exhausted_parent_chains,
        "Parsed session"
    );
    Ok(session)
}

/// Read one line into `buf` (newline and trailing `\r` stripped).
///
/// Returns `Ok(false)` at end of input. Never buffers more than `limit + 1` bytes.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
    line_number: usize,
) -> Result<bool, SessionError> {
    buf.clear();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let read = reader.by_ref().take(cap).read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(false);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.len() > limit {
        return Err(ParseError::LineTooLong {
            line: line_number,
            limit,
        }
        .into());
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(true)
}

/// Session id from a file path: the file stem, or `unknown-session`.
pub fn session_id_from_path(path: &Path) -> SessionId {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| SessionId::new(s).ok())
        .unwrap_or_else(SessionId::unknown)
}
