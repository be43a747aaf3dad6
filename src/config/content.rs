//! `[content]` and `[module]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[content]` section in gitstamp.toml.
///
/// # Example
/// ```toml
/// [content]
/// dir = "src/content/blog"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Content directory, relative to the repository root.
    /// Also the key prefix of the generated module.
    #[serde(default = "defaults::content::dir")]
    #[educe(Default = defaults::content::dir())]
    pub dir: String,
}

/// `[module]` section in gitstamp.toml - the generated data module.
///
/// # Example
/// ```toml
/// [module]
/// id = "virtual:creation-times"
/// output = "src/generated/creation-times.mjs"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    /// Id importers use for the module.
    #[serde(default = "defaults::module::id")]
    #[educe(Default = defaults::module::id())]
    pub id: String,

    /// File the module is written to; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::super::Config;
    use std::path::PathBuf;

    #[test]
    fn test_content_and_module_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.content.dir, "src/content/blog");
        assert_eq!(config.module.id, "virtual:creation-times");
        assert_eq!(config.module.output, None);
    }

    #[test]
    fn test_content_and_module_full() {
        let config = r#"
            [content]
            dir = "content/posts"

            [module]
            id = "virtual:post-dates"
            output = "generated/dates.mjs"
        "#;
        let config: Config = toml::from_str(config).unwrap();

        assert_eq!(config.content.dir, "content/posts");
        assert_eq!(config.module.id, "virtual:post-dates");
        assert_eq!(config.module.output, Some(PathBuf::from("generated/dates.mjs")));
    }
}
