// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::runner::{CommandError, CommandOutput, CommandRequest, CommandRunner};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any CommandRunner
#[derive(Clone)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for TracedRunner<R> {
    async fn run(&self, request: &CommandRequest) -> Result<CommandOutput, CommandError> {
        let program = request.argv.first().map(String::as_str).unwrap_or_default();
        let span = tracing::info_span!("command.run", program);
        async {
            tracing::info!(
                args = request.argv.len().saturating_sub(1),
                env_override = request.env.is_some(),
                "starting"
            );
            let start = std::time::Instant::now();
            let result = self.inner.run(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(output) if output.success() => {
                    tracing::info!(elapsed_ms, stdout_len = output.stdout.len(), "command finished")
                }
                Ok(output) => tracing::warn!(
                    elapsed_ms,
                    exit_code = ?output.exit_code,
                    stderr_len = output.stderr.len(),
                    "command exited non-zero"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "command failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
