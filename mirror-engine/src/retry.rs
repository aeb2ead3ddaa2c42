//! Retry-with-backoff execution of one destination's real mirror.

use std::path::Path;
use std::sync::Arc;

use tokio::time::Instant;

use mirror_core::types::{ExecutionResult, RetryPolicy, SyncPlan};

use crate::classify::classify;
use crate::error::EngineError;
use crate::invocation::ToolInvocation;
use crate::logger::{LogStream, RunLogger};
use crate::runner::ProcessRunner;

/// Run the mirroring tool against `destination` until a non-failure verdict
/// or the retry budget is exhausted.
///
/// The child wait runs under `spawn_blocking` and the backoff under
/// `tokio::time::sleep`, so neither stalls sibling destinations. Total
/// attempts never exceed `policy.max_retries + 1`.
///
/// # Errors
/// Only faults outside the modeled flow (spawn failure, signal-killed
/// child, worker panic). A failure *exit code* is a verdict, not an error.
pub async fn execute<R>(
    runner: Arc<R>,
    plan: &SyncPlan,
    destination: &Path,
    policy: &RetryPolicy,
    logger: &Arc<dyn RunLogger>,
) -> Result<ExecutionResult, EngineError>
where
    R: ProcessRunner + ?Sized + 'static,
{
    let invocation = Arc::new(ToolInvocation::real(plan, destination));
    let started = Instant::now();
    let mut attempt: u32 = 1;

    loop {
        let exit_code = run_once(runner.clone(), invocation.clone(), destination).await?;
        let verdict = classify(exit_code);

        logger.line(
            LogStream::Run,
            &format!(
                "{} attempt {} exited {} ({verdict})",
                destination.display(),
                attempt,
                exit_code,
            ),
        );
        tracing::debug!(
            destination = %destination.display(),
            attempt,
            exit_code,
            verdict = %verdict,
            "mirror attempt finished",
        );

        if !verdict.is_failure() {
            return Ok(ExecutionResult {
                destination: destination.to_path_buf(),
                verdict,
                exit_code,
                attempts: attempt,
                error_detail: None,
                duration: started.elapsed(),
            });
        }

        if attempt <= policy.max_retries {
            let delay = policy.delay_for_attempt(attempt);
            logger.line(
                LogStream::Run,
                &format!(
                    "{} attempt {} failed (exit code {}); retrying in {:.1}s",
                    destination.display(),
                    attempt,
                    exit_code,
                    delay.as_secs_f64(),
                ),
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
            continue;
        }

        let detail = format!(
            "retry budget exhausted after {attempt} attempts; last exit code {exit_code}"
        );
        logger.line(
            LogStream::Error,
            &format!("{}: {detail}", destination.display()),
        );
        return Ok(ExecutionResult {
            destination: destination.to_path_buf(),
            verdict,
            exit_code,
            attempts: attempt,
            error_detail: Some(detail),
            duration: started.elapsed(),
        });
    }
}

/// One blocking tool run, moved off the async workers.
pub(crate) async fn run_once<R>(
    runner: Arc<R>,
    invocation: Arc<ToolInvocation>,
    destination: &Path,
) -> Result<i32, EngineError>
where
    R: ProcessRunner + ?Sized + 'static,
{
    tokio::task::spawn_blocking(move || runner.run(&invocation))
        .await
        .map_err(|err| {
            EngineError::Join(format!("worker for {}: {err}", destination.display()))
        })?
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use mirror_core::types::Verdict;

    use super::*;
    use crate::logger::NullLogger;

    /// Replays a fixed script of exit codes, one per attempt.
    struct ScriptedRunner {
        codes: Mutex<Vec<i32>>,
        calls: AtomicUsize,
    }

    impl ScriptedRunner {
        fn new(codes: Vec<i32>) -> Self {
            Self {
                codes: Mutex::new(codes),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, _invocation: &ToolInvocation) -> Result<i32, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut codes = self.codes.lock().expect("script lock");
            if codes.is_empty() {
                panic!("ScriptedRunner invoked more often than scripted");
            }
            Ok(codes.remove(0))
        }
    }

    fn plan() -> SyncPlan {
        SyncPlan {
            source: PathBuf::from("/data/src"),
            destinations: vec![PathBuf::from("/mnt/d1")],
            exclusions: vec![],
            tool: PathBuf::from("robocopy"),
            tool_options: vec!["/MIR".to_string()],
            max_parallel_jobs: 1,
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }

    fn null_logger() -> Arc<dyn RunLogger> {
        Arc::new(NullLogger)
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_performs_exactly_one_run() {
        let runner = Arc::new(ScriptedRunner::new(vec![0]));
        let plan = plan();

        let result = execute(
            runner.clone(),
            &plan,
            &plan.destinations[0],
            &policy(3),
            &null_logger(),
        )
        .await
        .expect("execute");

        assert_eq!(result.verdict, Verdict::Success);
        assert_eq!(result.attempts, 1);
        assert_eq!(runner.calls(), 1);
        assert!(result.error_detail.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_third_attempt_with_warning_verdict() {
        let runner = Arc::new(ScriptedRunner::new(vec![8, 8, 1]));
        let plan = plan();

        let result = execute(
            runner.clone(),
            &plan,
            &plan.destinations[0],
            &policy(3),
            &null_logger(),
        )
        .await
        .expect("execute");

        assert_eq!(result.verdict, Verdict::SuccessWithWarnings);
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.attempts, 3);
        assert_eq!(runner.calls(), 3, "no further attempts after recovery");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_yields_failure_with_detail() {
        let runner = Arc::new(ScriptedRunner::new(vec![16, 16, 16]));
        let plan = plan();

        let result = execute(
            runner.clone(),
            &plan,
            &plan.destinations[0],
            &policy(2),
            &null_logger(),
        )
        .await
        .expect("execute");

        assert_eq!(result.verdict, Verdict::Failure);
        assert_eq!(result.exit_code, 16);
        assert_eq!(result.attempts, 3, "max_retries + 1 attempts");
        assert_eq!(runner.calls(), 3);
        let detail = result.error_detail.expect("exhaustion detail");
        assert!(detail.contains("exhausted"), "detail: {detail}");
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_scale_by_multiplier() {
        let runner = Arc::new(ScriptedRunner::new(vec![8, 8, 0]));
        let plan = plan();
        let started = Instant::now();

        let result = execute(
            runner,
            &plan,
            &plan.destinations[0],
            &policy(3),
            &null_logger(),
        )
        .await
        .expect("execute");

        // Two failed attempts sleep 5s then 10s of virtual time.
        assert_eq!(result.attempts, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }
}
