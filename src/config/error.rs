//! Configuration error types.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors from loading or checking `gitstamp.toml`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid config `{}`", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("{field} {reason}")]
    Validation { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
