//! Git-derived creation times for content files.
//!
//! # Flow
//!
//! ```text
//!  resolve(paths)
//!       │
//!       ▼
//!  normalize + dedup ──► cache.partition ──► hits ───────────────┐
//!                               │                                │
//!                               ▼ misses (if any)                │
//!                    HistorySource::query (one process)          │
//!                               │                                │
//!                               ▼                                │
//!                    parse_log ──► flatten ──► batch map         │
//!                               │   (last pair wins)             │
//!                               ▼                                ▼
//!                    cache.merge (insert-if-absent) ──► result ∩ requested
//! ```
//!
//! The whole output is parsed before anything is merged, so a failed query
//! or a malformed timestamp leaves the cache untouched.

mod cache;
mod error;
mod history;
mod parse;

pub use cache::CreationTimeCache;
pub use error::{QueryError, ResolveError};
pub use history::{CommitRange, GitCli, HistoryQuery, HistorySource};

use crate::log;
use chrono::{DateTime, FixedOffset};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

/// Creation time as reported by git (author date, author's offset).
pub type Timestamp = DateTime<FixedOffset>;

/// Resolves creation times, memoizing results in a shared cache.
#[derive(Debug)]
pub struct CreationTimeResolver<H> {
    cache: Arc<CreationTimeCache>,
    history: H,
    range: CommitRange,
}

impl<H: HistorySource> CreationTimeResolver<H> {
    pub fn new(history: H, cache: Arc<CreationTimeCache>) -> Self {
        Self {
            cache,
            history,
            range: CommitRange::default(),
        }
    }

    /// Restrict history queries to a commit range.
    pub fn with_range(mut self, range: CommitRange) -> Self {
        self.range = range;
        self
    }

    pub fn cache(&self) -> &Arc<CreationTimeCache> {
        &self.cache
    }

    /// Creation times for `paths`.
    ///
    /// Cached paths never trigger a query; all uncached paths share a single
    /// one. Paths with no add-event in history are omitted from the result.
    pub async fn resolve<I, S>(&self, paths: I) -> Result<BTreeMap<String, Timestamp>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: BTreeSet<String> = paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();

        let (mut result, misses) = self.cache.partition(&requested);
        if misses.is_empty() {
            return Ok(result);
        }

        log!("git"; "querying history for {} uncached files", misses.len());

        let query = HistoryQuery {
            paths: misses,
            range: self.range.clone(),
        };
        let output = self.history.query(&query).await?;
        let entries = parse::parse_log(&output)?;

        // Later add-events for the same path replace earlier ones; git lists
        // newest first, so the survivor is the oldest.
        let batch: BTreeMap<String, Timestamp> = parse::flatten(entries).collect();
        self.cache.merge(batch);

        for path in &query.paths {
            if let Some(time) = self.cache.get(path) {
                result.insert(path.clone(), time);
            }
        }
        Ok(result)
    }
}

/// Normalize a path to the repository-relative form git prints.
///
/// `./posts/a.md` and `posts\a.md` both become `posts/a.md`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_start_matches('/').to_owned()
}
