//! Bounded execution of introspection commands.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::TelemetryError;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Why a command produced no output at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("`{0}` is not installed")]
    NotFound(String),

    #[error("`{command}` timed out after {after:?}")]
    TimedOut { command: String, after: Duration },

    #[error("failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },
}

impl From<CommandError> for TelemetryError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::TimedOut { command, after } => TelemetryError::Timeout { command, after },
            other => TelemetryError::Unavailable(other.to_string()),
        }
    }
}

/// Runs external commands on behalf of the introspectors.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes, killing them when they overrun.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CommandError::NotFound(program.to_string()));
            }
            Ok(Err(e)) => {
                return Err(CommandError::Spawn {
                    command: command_line(program, args),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(CommandError::TimedOut {
                    command: command_line(program, args),
                    after: self.timeout,
                });
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Render a command for logs and error messages.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ")
}
