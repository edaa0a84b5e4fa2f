// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake command runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CommandError, CommandOutput, CommandRequest, CommandRunner};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&CommandRequest) -> Result<CommandOutput, CommandError> + Send + Sync>;

struct FakeRunnerState {
    calls: Vec<CommandRequest>,
    handler: Option<Handler>,
}

/// Fake runner that records every request.
///
/// Without a handler each command "succeeds" with exit code 0 and empty
/// output. Handlers can produce side effects such as writing the expected
/// output file.
#[derive(Clone)]
pub struct FakeCommandRunner {
    inner: Arc<Mutex<FakeRunnerState>>,
}

impl Default for FakeCommandRunner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRunnerState {
                calls: Vec::new(),
                handler: None,
            })),
        }
    }
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that answers every request with `handler`
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&CommandRequest) -> Result<CommandOutput, CommandError> + Send + Sync + 'static,
    {
        let runner = Self::default();
        runner.inner.lock().handler = Some(Arc::new(handler));
        runner
    }

    /// Runner that exits with `code` and the given output for every request
    pub fn exiting(code: i32, stdout: &str, stderr: &str) -> Self {
        let stdout = stdout.to_string();
        let stderr = stderr.to_string();
        Self::with_handler(move |request| {
            Ok(CommandOutput {
                argv: request.argv.clone(),
                exit_code: Some(code),
                stdout: stdout.clone(),
                stderr: stderr.clone(),
            })
        })
    }

    /// Requests seen so far, in order
    pub fn calls(&self) -> Vec<CommandRequest> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError> {
        // Clone the handler out so it runs without holding the lock
        let handler = {
            let mut inner = self.inner.lock();
            inner.calls.push(request.clone());
            inner.handler.clone()
        };
        match handler {
            Some(handler) => handler(request),
            None => Ok(CommandOutput {
                argv: request.argv.clone(),
                exit_code: Some(0),
                ..CommandOutput::default()
            }),
        }
    }
}
