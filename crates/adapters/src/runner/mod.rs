// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External command execution

mod process;

pub use process::ProcessRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCommandRunner;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from running a command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(
        "Command {} failed with exit code {}: {}",
        .argv.join(" "),
        exit_code_text(*.exit_code),
        failure_text(.stdout, .stderr)
    )]
    Failed {
        argv: Vec<String>,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("failed to start {}: {source}", .argv.join(" "))]
    Spawn {
        argv: Vec<String>,
        #[source]
        source: std::io::Error,
    },
    #[error("{} timed out after {}s", .argv.join(" "), .timeout.as_secs())]
    TimedOut { argv: Vec<String>, timeout: Duration },
    #[error("cannot run an empty command")]
    EmptyCommand,
}

fn exit_code_text(code: Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

fn failure_text<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    if stderr.is_empty() {
        stdout
    } else {
        stderr
    }
}

/// A command to run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandRequest {
    pub argv: Vec<String>,
    /// Replaces the inherited environment when set
    pub env: Option<BTreeMap<String, String>>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub argv: Vec<String>,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convert a non-zero exit into [`CommandError::Failed`].
    pub fn check(self) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::Failed {
                argv: self.argv,
                exit_code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs external commands.
///
/// A non-zero exit is reported through [`CommandOutput::exit_code`], not as
/// an error; callers decide whether it matters.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError>;
}

#[cfg(test)]
#[path = "../runner_tests.rs"]
mod tests;
