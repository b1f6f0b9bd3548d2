//! Pure core integration functions.
//!
//! Glue between the live tail reader and the record decoder: freshly appended
//! lines go through the same decoder, normalizer, and classifier a full parse
//! uses. Testable without any I/O.

use crate::model::{Message, ParseError};
use crate::parser::{decode_record, Route};

/// Decode tailed lines into classified messages.
///
/// This is a pure function that:
/// - Decodes each line into a record
/// - Keeps `user`/`assistant` records as messages, in input order
/// - Collects malformed lines as errors instead of stopping
///
/// Boundary, summary, and other records carry nothing a live consumer appends,
/// so they are dropped. Parent references are left as written; live messages
/// are not re-parented.
///
/// # Arguments
///
/// * `lines` - Raw JSONL lines to process
/// * `starting_line_number` - Line number of the first line (for error reporting)
///
/// # Returns
///
/// Tuple of (decoded messages, parse errors)
pub fn decode_lines<I, S>(lines: I, starting_line_number: usize) -> (Vec<Message>, Vec<ParseError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut messages = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let line_number = starting_line_number + index;
        match decode_record(line, line_number) {
            Ok(record) => {
                if let Route::Message(msg) = record.route {
                    messages.push(*msg);
                }
            }
            Err(err) => errors.push(err),
        }
    }

    (messages, errors)
}
