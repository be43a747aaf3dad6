//! Post creation time lookup for templates.
//!
//! Looks a post up in the creation times map by `<content-dir>/<post-id>`,
//! falling back to the current time for posts git has never seen (drafts
//! that are not committed yet).

use crate::resolver::Timestamp;
use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use std::{collections::BTreeMap, fmt};

/// Representation requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DateFormat {
    /// The timestamp itself
    #[default]
    Date,
    /// `2024-01-05T10:00:00.000Z`
    IsoString,
    /// Milliseconds since the Unix epoch
    Unix,
    /// `Jan 5, 2024`
    Formatted,
}

/// A post's creation time in one of the [`DateFormat`] representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostTime {
    Date(Timestamp),
    IsoString(String),
    Unix(i64),
    Formatted(String),
}

impl fmt::Display for PostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(time) => write!(f, "{}", time.to_rfc3339()),
            Self::IsoString(s) | Self::Formatted(s) => f.write_str(s),
            Self::Unix(ms) => write!(f, "{ms}"),
        }
    }
}

/// Convert `time` to the requested representation.
pub fn format_time(time: Timestamp, format: DateFormat) -> PostTime {
    match format {
        DateFormat::Date => PostTime::Date(time),
        DateFormat::IsoString => PostTime::IsoString(
            time.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        DateFormat::Unix => PostTime::Unix(time.timestamp_millis()),
        DateFormat::Formatted => PostTime::Formatted(time.format("%b %-d, %Y").to_string()),
    }
}

/// Creation time of `post_id`, or `now` when history has no record of it.
pub fn creation_time(
    times: &BTreeMap<String, Timestamp>,
    content_dir: &str,
    post_id: &str,
    format: DateFormat,
    now: Timestamp,
) -> PostTime {
    let key = post_key(content_dir, post_id);
    let time = times.get(&key).copied().unwrap_or(now);
    format_time(time, format)
}

/// Lookup key for a post: `<content-dir>/<post-id>`.
pub fn post_key(content_dir: &str, post_id: &str) -> String {
    format!(
        "{}/{}",
        content_dir.trim_end_matches('/'),
        post_id.trim_start_matches('/')
    )
}
