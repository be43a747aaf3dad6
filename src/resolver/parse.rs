//! Parser for `git log --diff-filter=A --pretty=format:%aI --name-only` output.
//!
//! The output is a sequence of blocks separated by a blank line. Each block
//! starts with the author date of one commit, followed by one path per line
//! for every file that commit added:
//!
//! ```text
//! 2024-02-10T08:30:00+02:00
//! posts/b.md
//! posts/c.md
//!
//! 2024-01-05T10:00:00+00:00
//! posts/a.md
//! ```
//!
//! `core.quotePath=false` keeps non-ASCII names raw, but git still quotes
//! names containing `"`, `\` or control characters, C-style:
//! `"posts/a\"b.md"`. Those lines are unquoted before use.

use super::{Timestamp, error::QueryError};
use chrono::DateTime;

/// One commit's add-events: a timestamp and the files it introduced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub files: Vec<String>,
}

/// Split history output into log entries, in listing order.
///
/// Any unparsable block header fails the whole parse, so callers never see a
/// partially valid result.
pub fn parse_log(output: &str) -> Result<Vec<LogEntry>, QueryError> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }

    output
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> Result<LogEntry, QueryError> {
    let mut lines = block.lines().map(|line| line.trim_end_matches('\r'));
    let header = lines.next().unwrap_or_default().trim();

    let timestamp = DateTime::parse_from_rfc3339(header).map_err(|source| QueryError::Timestamp {
        text: header.to_owned(),
        source,
    })?;

    let files = lines
        .filter(|line| !line.is_empty())
        .map(unquote_path)
        .collect::<Result<Vec<_>, QueryError>>()?;

    Ok(LogEntry { timestamp, files })
}

/// Undo git's C-style quoting of a path line. Unquoted lines pass through.
fn unquote_path(line: &str) -> Result<String, QueryError> {
    let Some(inner) = line
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Ok(line.to_owned());
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match iter.next() {
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b't') => bytes.push(b'\t'),
            Some(b'n') => bytes.push(b'\n'),
            Some(b'v') => bytes.push(0x0b),
            Some(b'f') => bytes.push(0x0c),
            Some(b'r') => bytes.push(b'\r'),
            Some(digit @ b'0'..=b'7') => {
                // Up to three octal digits, one raw byte.
                let mut value = u32::from(digit - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    Ok(String::from_utf8(bytes)?)
}

/// Flatten entries into `(path, timestamp)` pairs, preserving listing order.
///
/// No deduplication happens here; a path that was added more than once
/// appears once per add-event.
pub fn flatten(entries: Vec<LogEntry>) -> impl Iterator<Item = (String, Timestamp)> {
    entries.into_iter().flat_map(|entry| {
        let timestamp = entry.timestamp;
        entry.files.into_iter().map(move |file| (file, timestamp))
    })
}
