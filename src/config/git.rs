//! `[git]` section configuration.

use super::defaults;
use crate::resolver::CommitRange;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[git]` section in gitstamp.toml - history query settings.
///
/// # Example
/// ```toml
/// [git]
/// command = ["git"]
/// from = "v1.0"     # only add-events after this rev
/// to = ""           # up to HEAD
/// timeout = 30      # seconds, 0 disables
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Program (and leading args) used to query history.
    #[serde(default = "defaults::git::command")]
    #[educe(Default = defaults::git::command())]
    pub command: Vec<String>,

    /// Start of the commit range (exclusive). Empty means no lower bound.
    #[serde(default)]
    pub from: String,

    /// End of the commit range. Empty means HEAD.
    #[serde(default)]
    pub to: String,

    /// Seconds before a history query is killed.
    #[serde(default = "defaults::git::timeout")]
    #[educe(Default = defaults::git::timeout())]
    pub timeout: u64,
}

impl GitConfig {
    pub fn range(&self) -> CommitRange {
        CommitRange::new(Some(self.from.clone()), Some(self.to.clone()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}
