//! Resolver error types.

use std::{io, string::FromUtf8Error, time::Duration};
use thiserror::Error;

/// Why a single history query failed.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to spawn `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {}", describe_code(.code))]
    Exit { program: String, code: Option<i32> },

    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("I/O error while running `{program}`")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("history output is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    #[error("unparsable timestamp `{text}` in history output")]
    Timestamp {
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".into(),
    }
}

/// Error returned by [`super::CreationTimeResolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("history query failed")]
    HistoryQueryFailed(#[from] QueryError),
}

impl ResolveError {
    /// Exit status of the failed query, if it got that far.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::HistoryQueryFailed(QueryError::Exit { code, .. }) => *code,
            Self::HistoryQueryFailed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_display() {
        let err = QueryError::Exit {
            program: "git".into(),
            code: Some(128),
        };
        assert_eq!(err.to_string(), "`git` exited with code 128");

        let err = QueryError::Exit {
            program: "git".into(),
            code: None,
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_resolve_error_exit_code() {
        let err = ResolveError::from(QueryError::Exit {
            program: "git".into(),
            code: Some(1),
        });
        assert_eq!(err.exit_code(), Some(1));

        let err = ResolveError::from(QueryError::Timeout {
            program: "git".into(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(err.exit_code(), None);
    }
}
