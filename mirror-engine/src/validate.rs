//! Dry-run validation gate.
//!
//! One simulated tool run per destination, strictly sequential so the
//! `test` log stream stays deterministic and diffable. The first failure
//! aborts the gate; remaining destinations are never invoked. No retries
//! here — a broken plan should fail on the cheapest possible signal,
//! before any long real copy starts.

use std::sync::Arc;

use tokio::time::Instant;

use mirror_core::types::{ExecutionResult, SyncPlan};

use crate::classify::classify;
use crate::error::EngineError;
use crate::invocation::ToolInvocation;
use crate::logger::{LogStream, RunLogger};
use crate::retry::run_once;
use crate::runner::ProcessRunner;

/// Outcome of the validation phase.
#[derive(Debug)]
pub struct ValidationOutcome {
    /// True only if every destination was reached and none failed.
    pub passed: bool,
    /// One result per destination actually tested, in plan order.
    pub results: Vec<ExecutionResult>,
}

/// Simulate the mirror once per destination, short-circuiting on the first
/// failure verdict.
pub async fn validate<R>(
    runner: Arc<R>,
    plan: &SyncPlan,
    logger: &Arc<dyn RunLogger>,
) -> Result<ValidationOutcome, EngineError>
where
    R: ProcessRunner + ?Sized + 'static,
{
    let mut results = Vec::with_capacity(plan.destinations.len());

    for destination in &plan.destinations {
        let invocation = Arc::new(ToolInvocation::simulated(plan, destination));
        let started = Instant::now();

        let exit_code = run_once(runner.clone(), invocation, destination).await?;
        let verdict = classify(exit_code);

        logger.line(
            LogStream::Test,
            &format!(
                "[dry-run] {} exited {} ({verdict})",
                destination.display(),
                exit_code,
            ),
        );
        tracing::info!(
            destination = %destination.display(),
            exit_code,
            verdict = %verdict,
            "dry-run destination checked",
        );

        let failed = verdict.is_failure();
        results.push(ExecutionResult {
            destination: destination.clone(),
            verdict,
            exit_code,
            attempts: 1,
            error_detail: failed
                .then(|| format!("dry run failed with exit code {exit_code}")),
            duration: started.elapsed(),
        });

        if failed {
            return Ok(ValidationOutcome {
                passed: false,
                results,
            });
        }
    }

    Ok(ValidationOutcome {
        passed: true,
        results,
    })
}
