//! Bounded-parallelism fan-out over destinations.
//!
//! One task per destination; a semaphore of `max_parallel_jobs` permits
//! gates how many run their mirror at once — a hard ceiling, never exceeded
//! even transiently. Each worker pushes its result into an mpsc channel and
//! a single collector aggregates, so no worker ever reads another's
//! in-flight state.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use mirror_core::types::{ExecutionResult, RetryPolicy, SyncPlan};

use crate::error::EngineError;
use crate::logger::RunLogger;
use crate::retry;
use crate::runner::ProcessRunner;

/// Mirror every destination in the plan, at most `max_parallel_jobs` at a
/// time. Returns exactly one result per destination; completion order is
/// unspecified. Called once per plan, and only after validation passed.
pub async fn dispatch<R>(
    runner: Arc<R>,
    plan: Arc<SyncPlan>,
    policy: RetryPolicy,
    logger: Arc<dyn RunLogger>,
) -> Result<Vec<ExecutionResult>, EngineError>
where
    R: ProcessRunner + ?Sized + 'static,
{
    let total = plan.destinations.len();
    let semaphore = Arc::new(Semaphore::new(plan.max_parallel_jobs));
    let (result_tx, mut result_rx) = mpsc::channel::<Result<ExecutionResult, EngineError>>(total);

    for destination in plan.destinations.clone() {
        let runner = runner.clone();
        let plan = plan.clone();
        let policy = policy.clone();
        let logger = logger.clone();
        let semaphore = semaphore.clone();
        let result_tx = result_tx.clone();

        tokio::spawn(async move {
            // The semaphore is never closed while workers hold a clone, so
            // acquire failure can only mean the run is being torn down.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                let _ = result_tx
                    .send(Err(EngineError::ChannelClosed("dispatch semaphore")))
                    .await;
                return;
            };
            let result = retry::execute(runner, &plan, &destination, &policy, &logger).await;
            let _ = result_tx.send(result).await;
        });
    }
    drop(result_tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result?);
    }
    if results.len() != total {
        return Err(EngineError::ChannelClosed("dispatch results"));
    }
    Ok(results)
}
