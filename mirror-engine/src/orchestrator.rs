//! Top-level run state machine.
//!
//! `Idle → Validating → {ValidationFailed | Validated → Executing →
//! Completed}`, plus a `Faulted` terminal for anything outside the modeled
//! control flow. Faults are caught exactly once, here, and never re-raised.

use std::fmt;
use std::sync::Arc;

use mirror_core::types::{ExecutionResult, RetryPolicy, SyncPlan};

use crate::dispatch;
use crate::error::EngineError;
use crate::logger::{LogStream, RunLogger};
use crate::notify::Notifier;
use crate::runner::ProcessRunner;
use crate::validate;

/// Orchestrator phases. A report only ever carries a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    ValidationFailed,
    Validated,
    Executing,
    Completed,
    Faulted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Validating => "validating",
            RunState::ValidationFailed => "validation-failed",
            RunState::Validated => "validated",
            RunState::Executing => "executing",
            RunState::Completed => "completed",
            RunState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Final account of one mirror pass.
#[derive(Debug)]
pub struct RunReport {
    /// Terminal state: `Completed`, `ValidationFailed`, or `Faulted`.
    pub state: RunState,
    /// Dry-run results, in plan order, up to the first failure.
    pub validation: Vec<ExecutionResult>,
    /// Real-run results, completion order. Empty unless `Completed`.
    pub execution: Vec<ExecutionResult>,
    /// Human-readable fault description when `Faulted`.
    pub fault: Option<String>,
}

impl RunReport {
    /// True only when every destination's real run ended non-failure.
    pub fn fully_successful(&self) -> bool {
        self.state == RunState::Completed
            && self.execution.iter().all(|r| !r.verdict.is_failure())
    }

    /// Destinations whose retry budget was exhausted.
    pub fn failed_destinations(&self) -> Vec<&ExecutionResult> {
        self.execution
            .iter()
            .filter(|r| r.verdict.is_failure())
            .collect()
    }

    /// Process exit code: 0 once the real run completed (even partially
    /// failed), 1 when validation failed or the run faulted.
    pub fn process_exit_code(&self) -> i32 {
        match self.state {
            RunState::Completed => 0,
            _ => 1,
        }
    }
}

/// Drives one mirror pass: validation gate, then bounded-parallel real run.
pub struct Orchestrator<R: ?Sized> {
    runner: Arc<R>,
    logger: Arc<dyn RunLogger>,
    notifier: Arc<dyn Notifier>,
}

impl<R> Orchestrator<R>
where
    R: ProcessRunner + ?Sized + 'static,
{
    pub fn new(runner: Arc<R>, logger: Arc<dyn RunLogger>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            runner,
            logger,
            notifier,
        }
    }

    /// Run the full pass. Never panics outward and never returns an error:
    /// unexpected faults become a `Faulted` report.
    pub async fn run(&self, plan: SyncPlan, policy: RetryPolicy) -> RunReport {
        match self.try_run(&plan, &policy).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!(error = %err, "unexpected error during mirror run");
                self.logger
                    .line(LogStream::Error, &format!("unexpected error: {err}"));
                self.notifier
                    .notify("Mirror run failed", &format!("unexpected error: {err}"));
                RunReport {
                    state: RunState::Faulted,
                    validation: Vec::new(),
                    execution: Vec::new(),
                    fault: Some(err.to_string()),
                }
            }
        }
    }

    async fn try_run(
        &self,
        plan: &SyncPlan,
        policy: &RetryPolicy,
    ) -> Result<RunReport, EngineError> {
        self.transition(RunState::Idle, RunState::Validating);
        self.logger.line(
            LogStream::Test,
            &format!(
                "validating {} destination(s) before mirroring {}",
                plan.destinations.len(),
                plan.source.display(),
            ),
        );

        let outcome = validate::validate(self.runner.clone(), plan, &self.logger).await?;
        if !outcome.passed {
            self.transition(RunState::Validating, RunState::ValidationFailed);
            let failed = outcome
                .results
                .last()
                .map(|r| r.destination.display().to_string())
                .unwrap_or_default();
            let message = format!("dry run failed for {failed}; no destination was touched");
            self.logger.line(LogStream::Error, &message);
            self.notifier.notify("Mirror run aborted", &message);
            return Ok(RunReport {
                state: RunState::ValidationFailed,
                validation: outcome.results,
                execution: Vec::new(),
                fault: None,
            });
        }

        self.transition(RunState::Validating, RunState::Validated);
        self.transition(RunState::Validated, RunState::Executing);
        self.logger.line(
            LogStream::Run,
            &format!(
                "mirroring {} into {} destination(s), {} at a time",
                plan.source.display(),
                plan.destinations.len(),
                plan.max_parallel_jobs,
            ),
        );

        let execution = dispatch::dispatch(
            self.runner.clone(),
            Arc::new(plan.clone()),
            policy.clone(),
            self.logger.clone(),
        )
        .await?;

        self.transition(RunState::Executing, RunState::Completed);
        let report = RunReport {
            state: RunState::Completed,
            validation: outcome.results,
            execution,
            fault: None,
        };
        self.summarize(&report);
        Ok(report)
    }

    fn summarize(&self, report: &RunReport) {
        let failed = report.failed_destinations();
        if failed.is_empty() {
            let message = format!(
                "all {} destination(s) mirrored successfully",
                report.execution.len()
            );
            self.logger.line(LogStream::Run, &message);
            self.notifier.notify("Mirror run completed", &message);
        } else {
            let names: Vec<String> = failed
                .iter()
                .map(|r| r.destination.display().to_string())
                .collect();
            let message = format!(
                "{} of {} destination(s) failed: {}",
                failed.len(),
                report.execution.len(),
                names.join(", "),
            );
            self.logger.line(LogStream::Error, &message);
            self.notifier
                .notify("Mirror run completed with failures", &message);
        }
    }

    fn transition(&self, from: RunState, to: RunState) {
        tracing::info!(from = %from, to = %to, "orchestrator state transition");
    }
}
