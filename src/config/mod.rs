//! Configuration management for `gitstamp.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[git]`     | History query command, commit range, timeout     |
//! | `[content]` | Content directory (module key prefix)            |
//! | `[module]`  | Virtual module id and output file                |
//! | `[links]`   | `github://` link base URL                        |
//! | `[styles]`  | Highlight stylesheet import                      |
//! | `[watch]`   | Regenerate on ref changes                        |
//!
//! # Example
//!
//! ```toml
//! [git]
//! timeout = 60
//!
//! [content]
//! dir = "src/content/blog"
//!
//! [links]
//! github_base = "https://github.com/alice/blog/blob/main/"
//! ```

mod content;
pub mod defaults;
mod error;
mod git;
mod transform;

use content::{ContentConfig, ModuleConfig};
use error::ConfigError;
use git::GitConfig;
use transform::{LinksConfig, StylesConfig, WatchConfig};

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing gitstamp.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root (set from CLI, defaults to `./`)
    #[serde(skip)]
    pub root: Option<PathBuf>,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub module: ModuleConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let config = Self::from_str(&content)
            .map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.root = Some(Self::normalize_path(&root));
        self.config_path = Self::normalize_path(&self.get_root().join(&cli.config));

        Self::update_option(&mut self.content.dir, cli.content.as_ref());

        if let Some(query) = cli.query_args() {
            Self::update_option(&mut self.git.from, query.from.as_ref());
            Self::update_option(&mut self.git.to, query.to.as_ref());
            Self::update_option(&mut self.git.timeout, query.timeout.as_ref());
        }

        match &cli.command {
            Commands::Module { module, .. } | Commands::Watch { module, .. } => {
                if let Some(output) = &module.output {
                    self.module.output = Some(output.clone());
                }
            }
            Commands::Links { github_base, .. } => {
                if let Some(base) = github_base {
                    self.links.github_base = Some(base.clone());
                }
            }
            Commands::Styles { import, .. } => {
                Self::update_option(&mut self.styles.import, import.as_ref());
            }
            _ => {}
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    ///
    /// Errors name the config file the values were loaded from.
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        self.check(cli)
            .with_context(|| format!("Invalid config {}", self.config_path.display()))
    }

    fn check(&self, cli: &Cli) -> Result<()> {
        // Every command that runs the history query needs git.
        if matches!(
            cli.command,
            Commands::Resolve { .. }
                | Commands::Module { .. }
                | Commands::Watch { .. }
                | Commands::Post { .. }
        ) {
            Self::check_command_installed("[git.command]", &self.git.command)?;
        }

        let dir = Path::new(&self.content.dir);
        if self.content.dir.is_empty() || dir.is_absolute() {
            bail!(ConfigError::invalid(
                "[content.dir]",
                "must be a non-empty path relative to the repository root"
            ));
        }

        if let Some(base) = &self.links.github_base {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                bail!(ConfigError::invalid(
                    "[links.github_base]",
                    "must start with http:// or https://"
                ));
            }
            if !base.ends_with('/') {
                bail!(ConfigError::invalid("[links.github_base]", "must end with `/`"));
            }
        }

        if self.module.id.is_empty() {
            bail!(ConfigError::invalid("[module.id]", "must not be empty"));
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &'static str, command: &[String]) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::invalid(field, "must have at least one element"));
        }

        let cmd = &command[0];
        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
