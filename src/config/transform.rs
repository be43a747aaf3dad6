//! `[links]`, `[styles]` and `[watch]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[links]` section in gitstamp.toml - anchor rewriting.
///
/// # Example
/// ```toml
/// [links]
/// github_base = "https://github.com/alice/blog/blob/main/"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    /// Base URL `github://<path>` links expand against. Must end with `/`.
    #[serde(default)]
    pub github_base: Option<String>,
}

/// `[styles]` section in gitstamp.toml - highlight stylesheet injection.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct StylesConfig {
    /// Stylesheet imported by Markdown modules with highlighted code.
    #[serde(default = "defaults::styles::import")]
    #[educe(Default = defaults::styles::import())]
    pub import: String,
}

/// `[watch]` section in gitstamp.toml.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Regenerate the module when HEAD or a branch moves.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,
}
