//! External command execution.
//!
//! Runs a command with stdout captured and stderr passed through to our own
//! stderr, so git's warnings reach the user unchanged.

use crate::resolver::QueryError;
use std::{
    ffi::OsString,
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};
use tokio::{io::AsyncReadExt, process::Command};

/// Captured result of a finished process.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
}

/// Filter out empty args.
#[inline]
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

/// Prepare a Command from components.
///
/// `cmd` is the program followed by any leading arguments from config.
pub fn prepare(root: Option<&Path>, cmd: &[String], args: &[OsString]) -> Option<(String, Command)> {
    let (program, leading) = cmd.split_first()?;

    let mut command = Command::new(program);
    command.args(leading).args(filter_args(args));

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Some((program.clone(), command))
}

/// Spawn `command` and collect its stdout until exit.
///
/// Chunks are appended in arrival order. When `timeout` elapses the child is
/// killed (via `kill_on_drop`) and a [`QueryError::Timeout`] is returned.
pub async fn capture(
    name: &str,
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<Captured, QueryError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| QueryError::Spawn {
        program: name.to_owned(),
        source,
    })?;

    let io_err = |source| QueryError::Io {
        program: name.to_owned(),
        source,
    };

    let mut stdout_pipe = child.stdout.take();
    let run = async {
        let mut stdout = Vec::new();
        if let Some(pipe) = stdout_pipe.as_mut() {
            pipe.read_to_end(&mut stdout).await.map_err(io_err)?;
        }
        let status = child.wait().await.map_err(io_err)?;
        Ok::<_, QueryError>(Captured { status, stdout })
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| QueryError::Timeout {
                program: name.to_owned(),
                timeout: limit,
            })?,
        None => run.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args() {
        let args = [OsString::from("a"), OsString::from(""), OsString::from("b")];
        let filtered = filter_args(&args);
        assert_eq!(filtered, vec![OsString::from("a"), OsString::from("b")]);
    }

    #[test]
    fn test_prepare_empty() {
        assert!(prepare(None, &[], &[]).is_none());
    }

    #[test]
    fn test_prepare_valid() {
        let cmd = vec!["git".to_string(), "-c".to_string(), "x=y".to_string()];
        let (name, command) = prepare(None, &cmd, &[OsString::from("log")]).unwrap();
        assert_eq!(name, "git");

        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args, vec!["-c", "x=y", "log"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_stdout() {
        let cmd = vec!["echo".to_string()];
        let (name, command) = prepare(None, &cmd, &[OsString::from("hello")]).unwrap();
        let captured = capture(&name, command, None).await.unwrap();

        assert!(captured.status.success());
        assert_eq!(captured.stdout, b"hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_capture_timeout() {
        let cmd = vec!["sleep".to_string()];
        let (name, command) = prepare(None, &cmd, &[OsString::from("5")]).unwrap();
        let err = capture(&name, command, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, QueryError::Timeout { .. }));
    }

    #[test]
    fn test_capture_spawn_failure() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let cmd = vec!["definitely-not-a-real-binary-4a1f".to_string()];
        let (name, command) = prepare(None, &cmd, &[]).unwrap();
        let err = rt.block_on(capture(&name, command, None)).unwrap_err();

        assert!(matches!(err, QueryError::Spawn { .. }));
    }
}
