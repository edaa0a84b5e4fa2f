// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use crate::runner::{CommandError, CommandOutput, CommandRequest, CommandRunner, ProcessRunner};
use std::collections::BTreeMap;
use std::time::Duration;

/// Options for [`run_command`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Turn a non-zero exit into [`CommandError::Failed`]
    pub check: bool,
    /// Replaces the inherited environment when set
    pub env: Option<BTreeMap<String, String>>,
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            check: true,
            env: None,
            timeout: None,
        }
    }
}

impl RunOptions {
    pub fn unchecked() -> Self {
        Self {
            check: false,
            ..Self::default()
        }
    }

    pub fn env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Run `argv` as a child process and capture its output.
pub async fn run_command<I, S>(argv: I, options: RunOptions) -> Result<CommandOutput, CommandError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    run_command_with(&ProcessRunner, argv, options).await
}

/// [`run_command`] through an arbitrary runner.
pub async fn run_command_with<R, I, S>(
    runner: &R,
    argv: I,
    options: RunOptions,
) -> Result<CommandOutput, CommandError>
where
    R: CommandRunner + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let request = CommandRequest {
        argv: argv.into_iter().map(Into::into).collect(),
        env: options.env,
        cwd: None,
        timeout: options.timeout,
    };
    if request.argv.is_empty() {
        return Err(CommandError::EmptyCommand);
    }
    let output = runner.run(&request).await?;
    if options.check {
        output.check()
    } else {
        Ok(output)
    }
}

/// Render `argv` as a single command line, quoting arguments that contain
/// whitespace or are empty.
pub fn format_command<S: AsRef<str>>(argv: &[S]) -> String {
    if argv.is_empty() {
        return "<empty command>".to_string();
    }
    argv.iter()
        .map(|arg| quote_arg(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `[test-mode] $ <cmdline>`
pub fn test_mode_banner<S: AsRef<str>>(argv: &[S]) -> String {
    format!("[test-mode] $ {}", format_command(argv))
}

// Backslashes are literal unless they precede a double quote, in which case
// they are doubled and the quote escaped.
fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }
    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                out.push_str(&"\\".repeat(backslashes * 2));
                out.push_str("\\\"");
                backslashes = 0;
            }
            _ => {
                out.push_str(&"\\".repeat(backslashes));
                backslashes = 0;
                out.push(c);
            }
        }
    }
    out.push_str(&"\\".repeat(backslashes));
    if needs_quotes {
        // Trailing backslashes must not escape the closing quote
        out.push_str(&"\\".repeat(backslashes));
        out.push('"');
    }
    out
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
