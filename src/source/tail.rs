//! Polling tail reader for a growing session file.
//!
//! [`LineTailer`] is the per-subscription state machine: each [`tick`](LineTailer::tick)
//! compares the file size with the recorded offset, reads at most one bounded
//! chunk of new bytes, and returns the complete lines it finished. A trailing
//! fragment without a newline is carried over to the next tick.
//!
//! [`spawn_tail`] drives a tailer on a fixed interval from a dedicated thread and
//! delivers lines over a channel until the subscription is cancelled.

use crate::model::error::InputError;
use crate::parser::DEFAULT_MAX_LINE_BYTES;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default per-tick read ceiling: 1 MiB.
pub const DEFAULT_MAX_CHUNK_BYTES: u64 = 1024 * 1024;

// ===== Options =====

/// Where a new tailer starts reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailStart {
    /// Emit every line already in the file, then follow.
    Beginning,
    /// Skip existing content; emit only lines appended from now on.
    ///
    /// The session is normally parsed in full before tailing starts, so this is
    /// the default.
    #[default]
    End,
}

/// Tail reader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailOptions {
    /// Time between ticks.
    pub poll_interval: Duration,
    /// Most bytes read in one tick.
    pub max_chunk_bytes: u64,
    /// Longest partial line carried between ticks before it is discarded.
    pub max_line_bytes: usize,
    /// Initial offset policy.
    pub start: TailStart,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            start: TailStart::End,
        }
    }
}

// ===== LineTailer =====

/// Tail state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// No new bytes on the last check.
    Idle,
    /// Growth detected; a chunk is being read.
    Reading,
    /// Subscriber gone; ticks do nothing.
    Closed,
}

/// Incremental line reader over one file.
///
/// # Invariants
///
/// - `offset` counts every byte consumed so far, including the bytes held in `carry`
/// - no line is emitted twice and none is emitted partially
#[derive(Debug)]
pub struct LineTailer {
    path: PathBuf,
    offset: u64,
    carry: Vec<u8>,
    discarding: bool,
    max_chunk_bytes: u64,
    max_line_bytes: usize,
    state: TailState,
}

impl LineTailer {
    /// Create a tailer that starts at offset 0 of `path`, whatever `options.start` says.
    ///
    /// Does no I/O; a missing file simply yields nothing until it appears. Use
    /// [`open`](Self::open) to honour the start policy.
    pub fn new(path: impl Into<PathBuf>, options: &TailOptions) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            carry: Vec::new(),
            discarding: false,
            max_chunk_bytes: options.max_chunk_bytes.max(1),
            max_line_bytes: options.max_line_bytes,
            state: TailState::Idle,
        }
    }

    /// Open a tailer positioned according to `options.start`.
    ///
    /// # Errors
    ///
    /// [`InputError::FileNotFound`] when the file does not exist, [`InputError::Io`]
    /// when it cannot be inspected.
    pub fn open(path: impl Into<PathBuf>, options: &TailOptions) -> Result<Self, InputError> {
        let mut tailer = Self::new(path, options);
        let size = fs::metadata(&tailer.path)
            .map_err(|e| InputError::from_open(&tailer.path, e))?
            .len();
        if options.start == TailStart::End {
            tailer.offset = size;
        }
        Ok(tailer)
    }

    /// File being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Current state.
    pub fn state(&self) -> TailState {
        self.state
    }

    /// Stop the tailer; later ticks return nothing.
    pub fn close(&mut self) {
        self.state = TailState::Closed;
        self.carry = Vec::new();
    }

    /// Run one poll step.
    ///
    /// Returns the complete, non-blank lines finished by the newly read bytes, in
    /// order. A file that did not grow (or shrank) yields nothing.
    ///
    /// # Errors
    ///
    /// Any stat/open/seek/read failure. The offset is left untouched, so the caller
    /// can simply retry on the next interval.
    pub fn tick(&mut self) -> io::Result<Vec<String>> {
        if self.state == TailState::Closed {
            return Ok(Vec::new());
        }

        let size = fs::metadata(&self.path)?.len();
        if size <= self.offset {
            self.state = TailState::Idle;
            trace!(path = %self.path.display(), offset = self.offset, "Tail idle");
            return Ok(Vec::new());
        }

        self.state = TailState::Reading;
        let pending = (size - self.offset).min(self.max_chunk_bytes);
        let chunk = self.read_chunk(pending);
        self.state = TailState::Idle;
        let chunk = chunk?;

        self.offset += chunk.len() as u64;
        let lines = self.split_lines(&chunk);
        trace!(
            path = %self.path.display(),
            read = chunk.len(),
            offset = self.offset,
            lines = lines.len(),
            carried = self.carry.len(),
            "Tail tick"
        );
        Ok(lines)
    }

    fn read_chunk(&self, pending: u64) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        let mut chunk = Vec::with_capacity(usize::try_from(pending).unwrap_or(0));
        file.take(pending).read_to_end(&mut chunk)?;
        Ok(chunk)
    }

    fn split_lines(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let head = &rest[..pos];
            rest = &rest[pos + 1..];

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if self.carry.len() + head.len() > self.max_line_bytes {
                warn!(
                    path = %self.path.display(),
                    limit = self.max_line_bytes,
                    "Dropping tailed line over the maximum line length"
                );
                self.carry.clear();
                continue;
            }

            self.carry.extend_from_slice(head);
            let raw = std::mem::take(&mut self.carry);
            if let Some(line) = finish_line(&raw) {
                lines.push(line);
            }
        }

        if !self.discarding && !rest.is_empty() {
            if self.carry.len() + rest.len() > self.max_line_bytes {
                warn!(
                    path = %self.path.display(),
                    limit = self.max_line_bytes,
                    "Discarding oversized partial line until the next newline"
                );
                self.carry = Vec::new();
                self.discarding = true;
            } else {
                self.carry.extend_from_slice(rest);
            }
        }

        lines
    }
}

/// Bytes of one complete line to trimmed text; `None` for blank lines.
fn finish_line(raw: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

// ===== Subscription =====

/// A running tail: lines arrive on [`lines`](Self::lines) until cancelled.
///
/// Dropping the subscription cancels it.
#[derive(Debug)]
pub struct TailSubscription {
    lines: Receiver<String>,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TailSubscription {
    /// Channel of tailed lines, in file order.
    pub fn lines(&self) -> &Receiver<String> {
        &self.lines
    }

    /// Wait up to `timeout` for the next line.
    ///
    /// # Errors
    ///
    /// `Timeout` when nothing arrived, `Disconnected` when the poll loop stopped.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<String, RecvTimeoutError> {
        self.lines.recv_timeout(timeout)
    }

    /// Stop polling and wait for the poll thread to release the file.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Tail thread panicked");
            }
        }
    }
}

impl Drop for TailSubscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start polling `tailer` every `interval` on a background thread.
///
/// # Errors
///
/// Returns the I/O error if the thread cannot be spawned.
pub fn spawn_tail(mut tailer: LineTailer, interval: Duration) -> io::Result<TailSubscription> {
    let (line_tx, line_rx) = mpsc::channel();
    let (cancel_tx, cancel_rx) = mpsc::channel();

    let name = format!(
        "tail-{}",
        tailer
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let handle = thread::Builder::new()
        .name(name)
        .spawn(move || run_tail_loop(&mut tailer, interval, &cancel_rx, &line_tx))?;

    Ok(TailSubscription {
        lines: line_rx,
        cancel: Some(cancel_tx),
        handle: Some(handle),
    })
}

fn run_tail_loop(
    tailer: &mut LineTailer,
    interval: Duration,
    cancel: &Receiver<()>,
    out: &Sender<String>,
) {
    let mut failures = 0u32;

    loop {
        match cancel.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        match tailer.tick() {
            Ok(lines) => {
                failures = 0;
                for line in lines {
                    if out.send(line).is_err() {
                        debug!(path = %tailer.path().display(), "Tail receiver dropped");
                        tailer.close();
                        return;
                    }
                }
            }
            Err(err) => {
                failures += 1;
                if failures == 1 {
                    warn!(path = %tailer.path().display(), error = %err, "Tail tick failed; retrying");
                } else {
                    debug!(path = %tailer.path().display(), error = %err, failures, "Tail tick failed again");
                }
            }
        }
    }

    tailer.close();
    debug!(path = %tailer.path().display(), "Tail stopped");
}
