//! Version-control history queries.
//!
//! [`HistorySource`] is the seam between the resolver and the external
//! process; [`GitCli`] is the implementation backed by `git log`.

use super::error::QueryError;
use crate::utils::exec;
use std::{
    ffi::OsString,
    path::PathBuf,
    time::Duration,
};

/// Optional `from..to` restriction on the history walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl CommitRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            from: non_empty(from),
            to: non_empty(to),
        }
    }

    /// Revision argument for `git log`, or `None` for the whole history.
    pub fn to_arg(&self) -> Option<String> {
        match (&self.from, &self.to) {
            (None, None) => None,
            (Some(from), None) => Some(format!("{from}..")),
            // `..to` would mean `HEAD..to`
            (None, Some(to)) => Some(to.clone()),
            (Some(from), Some(to)) => Some(format!("{from}..{to}")),
        }
    }
}

/// One history query: add-events for exactly `paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub paths: Vec<String>,
    pub range: CommitRange,
}

impl HistoryQuery {
    /// Full `git log` argument list for this query.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-c",
            "core.quotePath=false",
            "log",
            "--diff-filter=A",
            "--pretty=format:%aI",
            "--name-only",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        if let Some(range) = self.range.to_arg() {
            args.push(range.into());
        }

        args.push("--".into());
        args.extend(self.paths.iter().map(OsString::from));
        args
    }
}

/// Source of raw add-event history text.
pub trait HistorySource {
    async fn query(&self, query: &HistoryQuery) -> Result<String, QueryError>;
}

/// Runs `git log` in a repository working tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    command: Vec<String>,
    workdir: PathBuf,
    timeout: Option<Duration>,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            command: vec!["git".into()],
            workdir: workdir.into(),
            timeout: None,
        }
    }

    /// Override the program (and leading args) used instead of plain `git`.
    ///
    /// An empty list keeps the current command.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        if !command.is_empty() {
            self.command = command;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl HistorySource for GitCli {
    async fn query(&self, query: &HistoryQuery) -> Result<String, QueryError> {
        let (name, command) =
            exec::prepare(Some(self.workdir.as_path()), &self.command, &query.to_args()).ok_or_else(
                || QueryError::Spawn {
                    program: "<empty>".into(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
                },
            )?;

        let captured = exec::capture(&name, command, self.timeout).await?;

        if !captured.status.success() {
            return Err(QueryError::Exit {
                program: name,
                code: captured.status.code(),
            });
        }

        Ok(String::from_utf8(captured.stdout)?)
    }
}
