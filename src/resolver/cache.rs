//! Session-scoped creation time cache.
//!
//! Entries are additive only: a path's first resolved timestamp is kept for
//! the lifetime of the cache, since a file's first commit never changes.

use super::Timestamp;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Thread-safe map from repository-relative path to creation time.
///
/// Shared via `Arc` between the resolver and whatever owns the build session.
#[derive(Debug, Default)]
pub struct CreationTimeCache {
    entries: RwLock<FxHashMap<String, Timestamp>>,
}

impl CreationTimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Timestamp> {
        self.entries.read().get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Split `paths` into cached hits and the paths still to be resolved.
    pub fn partition<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a String>,
    ) -> (BTreeMap<String, Timestamp>, Vec<String>) {
        let entries = self.entries.read();
        let mut hits = BTreeMap::new();
        let mut misses = Vec::new();

        for path in paths {
            match entries.get(path) {
                Some(time) => {
                    hits.insert(path.clone(), *time);
                }
                None => misses.push(path.clone()),
            }
        }
        (hits, misses)
    }

    /// Insert every pair whose path is not cached yet.
    ///
    /// Returns the number of new entries.
    pub fn merge(&self, pairs: impl IntoIterator<Item = (String, Timestamp)>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        for (path, time) in pairs {
            entries.entry(path).or_insert(time);
        }
        entries.len() - before
    }

    /// Sorted copy of every entry under `prefix` (a directory, no trailing slash).
    pub fn snapshot_under(&self, prefix: &str) -> BTreeMap<String, Timestamp> {
        let prefix = prefix.trim_end_matches('/');
        self.entries
            .read()
            .iter()
            .filter(|(path, _)| is_under(path, prefix))
            .map(|(path, time)| (path.clone(), *time))
            .collect()
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
