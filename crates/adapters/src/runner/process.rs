// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner that spawns real child processes

use super::{CommandError, CommandOutput, CommandRequest, CommandRunner};
use crate::subprocess::test_mode_banner;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns commands with `tokio::process`, capturing stdout and stderr.
///
/// The child is killed if the future is dropped or the request timeout
/// elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError> {
        let Some((program, args)) = request.argv.split_first() else {
            return Err(CommandError::EmptyCommand);
        };

        tracing::debug!(command = %request.argv.join(" "), "running command");
        if xm_core::env::test_mode() {
            let banner = test_mode_banner(&request.argv);
            tracing::info!(command = %banner, "test-mode automation command");
            println!("{banner}");
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(env) = &request.env {
            cmd.env_clear().envs(env);
        }
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        let spawn_err = |source| CommandError::Spawn {
            argv: request.argv.clone(),
            source,
        };
        let output = match request.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, cmd.output()).await {
                Ok(result) => result.map_err(spawn_err)?,
                Err(_elapsed) => {
                    return Err(CommandError::TimedOut {
                        argv: request.argv.clone(),
                        timeout,
                    })
                }
            },
            None => cmd.output().await.map_err(spawn_err)?,
        };

        Ok(CommandOutput {
            argv: request.argv.clone(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
