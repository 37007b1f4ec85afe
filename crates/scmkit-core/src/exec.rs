//! Process execution boundary.
//!
//! The checkout driver never spawns processes itself; it hands a [`Cmd`] to
//! an [`Executor`]. [`OsExecutor`] runs commands with `tokio::process`; tests
//! substitute a recording mock.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ExecError;

/// One process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    /// Program followed by its arguments.
    pub args: Vec<String>,
    /// Working directory; inherits the caller's when `None`.
    pub dir: Option<PathBuf>,
    /// Environment overrides applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Whether standard error should be captured into [`ExecOutput::stderr`].
    pub capture_stderr: bool,
}

impl Cmd {
    /// Command from a program and its arguments.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Run in `dir`.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set an environment variable for this invocation.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Capture standard error.
    #[must_use]
    pub fn capturing_stderr(mut self) -> Self {
        self.capture_stderr = true;
        self
    }

    /// The program name, if any.
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code; `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error (empty unless requested).
    pub stderr: String,
}

impl ExecOutput {
    /// A successful exit with no output.
    #[must_use]
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Self::default()
        }
    }

    /// A failed exit with the given code and stderr.
    #[must_use]
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The exit as an error, or `None` on success.
    #[must_use]
    pub fn exit_error(&self) -> Option<ExecError> {
        match self.exit_code {
            Some(0) => None,
            Some(code) => Some(ExecError::Exit { code }),
            None => Some(ExecError::Terminated),
        }
    }
}

/// Runs commands to completion.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `cmd` and wait for it to exit.
    ///
    /// A non-zero exit is reported through [`ExecOutput::exit_code`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] if the process could not be started or did not
    /// finish within the executor's timeout.
    async fn execute(&self, cmd: &Cmd) -> Result<ExecOutput, ExecError>;
}

/// Executes commands as child processes of the current process.
///
/// Standard input is always null and `GIT_TERMINAL_PROMPT=0` is set, so a
/// clone that needs interactive credentials fails instead of hanging.
#[derive(Debug, Clone, Default)]
pub struct OsExecutor {
    timeout: Option<Duration>,
}

impl OsExecutor {
    /// Executor without a timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Executor for OsExecutor {
    async fn execute(&self, cmd: &Cmd) -> Result<ExecOutput, ExecError> {
        let (program, rest) = cmd.args.split_first().ok_or(ExecError::EmptyCommand)?;

        let mut command = Command::new(program);
        command.args(rest);
        if let Some(dir) = &cmd.dir {
            command.current_dir(dir);
        }
        command.env("GIT_TERMINAL_PROMPT", "0");
        for (key, value) in &cmd.env {
            command.env(key, value);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(if cmd.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        // Dropping the output future on timeout kills the child.
        command.kill_on_drop(true);

        debug!(program = %program, args = rest.len(), "spawning process");
        let output = match self.timeout {
            Some(after) => tokio::time::timeout(after, command.output())
                .await
                .map_err(|_| {
                    warn!(program = %program, timeout_secs = after.as_secs(), "process timed out");
                    ExecError::TimedOut {
                        program: program.clone(),
                        after,
                    }
                })?,
            None => command.output().await,
        }
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;

        Ok(ExecOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Cmd {
        Cmd::new(["sh", "-c", script])
    }

    #[tokio::test]
    async fn captures_exit_code_and_stderr() {
        let out = OsExecutor::new()
            .execute(&sh("echo oops >&2; exit 3").capturing_stderr())
            .await
            .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "oops");
        assert!(matches!(out.exit_error(), Some(ExecError::Exit { code: 3 })));
    }

    #[tokio::test]
    async fn stderr_is_dropped_unless_requested() {
        let out = OsExecutor::new().execute(&sh("echo oops >&2")).await.unwrap();
        assert!(out.is_success());
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn applies_dir_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = sh("printf '%s|%s|%s' \"$(pwd -P)\" \"$SCMKIT_PROBE\" \"$GIT_TERMINAL_PROMPT\"")
            .with_dir(dir.path())
            .with_env("SCMKIT_PROBE", "yes");
        let out = OsExecutor::new().execute(&cmd).await.unwrap();
        let expected = format!("{}|yes|0", dir.path().canonicalize().unwrap().display());
        assert_eq!(out.stdout, expected);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = OsExecutor::new()
            .execute(&Cmd::new(["scmkit-definitely-not-a-binary"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { program, .. } if program == "scmkit-definitely-not-a-binary"));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = OsExecutor::new().execute(&Cmd::default()).await.unwrap_err();
        assert!(matches!(err, ExecError::EmptyCommand));
    }

    #[tokio::test]
    async fn timeout_kills_long_running_process() {
        let err = OsExecutor::new()
            .with_timeout(Duration::from_millis(100))
            .execute(&Cmd::new(["sleep", "5"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::TimedOut { program, .. } if program == "sleep"));
    }
}
