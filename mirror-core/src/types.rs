//! Domain types for a mirror run.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. A [`SyncPlan`] is constructed once by the config loader and never
//! mutated afterwards — every engine component borrows or clones it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Everything the engine needs to mirror one source tree into N destinations.
///
/// Immutable once constructed. The same plan (and the same `tool_options`)
/// is used for both the validation pass and the real run; only the
/// simulate flag differs between the two phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Root of the tree being mirrored.
    pub source: PathBuf,
    /// Destination roots, in config order. Never empty.
    pub destinations: Vec<PathBuf>,
    /// Directory names excluded from the mirror, one `/XD` pair each.
    pub exclusions: Vec<String>,
    /// Path or name of the external mirroring tool binary.
    pub tool: PathBuf,
    /// Tool flags, already split into discrete arguments.
    pub tool_options: Vec<String>,
    /// Hard ceiling on concurrently mirroring destinations. Always >= 1.
    pub max_parallel_jobs: usize,
}

/// Retry budget and backoff shape for one destination's real-run attempts.
///
/// Configuration value; never mutated at runtime. The delay before retry
/// `n` (1-based) is `initial_delay * backoff_multiplier^(n-1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Scale factor applied per retry. Always > 1.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Backoff to sleep after failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(exponent as i32))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// The classified meaning of a mirroring-tool exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Exit code 0 — nothing to do, trees already match.
    Success,
    /// Exit codes 1..=7 — files were copied, or mismatches/extras detected.
    SuccessWithWarnings,
    /// Exit codes >= 8 — at least one copy error.
    Failure,
}

impl Verdict {
    pub fn is_failure(self) -> bool {
        matches!(self, Verdict::Failure)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "success"),
            Verdict::SuccessWithWarnings => write!(f, "success-with-warnings"),
            Verdict::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome of mirroring one destination in one phase.
///
/// Exactly one of these exists per destination per phase it was subjected
/// to; immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub destination: PathBuf,
    pub verdict: Verdict,
    /// Raw exit code of the final attempt.
    pub exit_code: i32,
    /// Attempts actually performed; never exceeds `max_retries + 1`.
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub duration: Duration,
}
