//! forge::process
//!
//! Subprocess execution for provider CLIs (`gh`, `glab`, `az`, `tea`).
//!
//! Every invocation carries an explicit timeout. When it fires the child is
//! killed (`kill_on_drop`) and the call reports [`ProcessError::Timeout`].
//! Only stdout is parsed; stderr is kept for diagnostics.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use super::traits::ForgeError;

/// Errors from running a subprocess.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program is not on `PATH`.
    #[error("command not found: {0}")]
    NotFound(String),

    /// The program did not finish in time and was killed.
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// The program ran but exited unsuccessfully.
    #[error("{program} exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    /// Spawning or waiting failed.
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

impl From<ProcessError> for ForgeError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound(program) => {
                ForgeError::Unavailable(format!("{} is not installed", program))
            }
            ProcessError::Timeout { .. } => ForgeError::Unreachable(err.to_string()),
            ProcessError::NonZeroExit { .. } => ForgeError::NotFound(err.to_string()),
            ProcessError::Io { .. } => ForgeError::Unavailable(err.to_string()),
        }
    }
}

/// Captured output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code (-1 when killed by a signal)
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs.
///
/// Adapters depend on this trait rather than on `tokio::process` so tests
/// can script CLI behaviour (see [`crate::forge::mock::ScriptedRunner`]).
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve a program name through the host's command lookup.
    fn resolve(&self, program: &str) -> Option<PathBuf>;

    /// Run a program with a timeout and capture its output.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError>;

    /// Run a program and return stdout, treating a non-zero exit as an error.
    async fn run_ok(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<String, ProcessError> {
        let output = self.run(program, args, timeout).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(ProcessError::NonZeroExit {
                program: program.to_string(),
                code: output.exit_code,
                stderr: first_line(&output.stderr),
            })
        }
    }
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    fn resolve(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError> {
        let path = self
            .resolve(program)
            .ok_or_else(|| ProcessError::NotFound(program.to_string()))?;

        debug!(program, ?args, ?timeout, "running command");

        let mut command = Command::new(path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Keep CLIs from paging, prompting or colouring their output
            .env("NO_COLOR", "1")
            .env("GH_PROMPT_DISABLED", "1")
            .env("PAGER", "cat")
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(result) => result.map_err(|source| ProcessError::Io {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                debug!(program, ?timeout, "command timed out");
                return Err(ProcessError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        };
        debug!(
            program,
            exit_code = result.exit_code,
            stdout_len = result.stdout.len(),
            "command completed"
        );
        Ok(result)
    }
}

/// First non-empty line of a tool's stderr, for compact error messages.
fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}
