//! # mirror-engine
//!
//! Sync orchestration engine: dry-run validation gate, per-destination
//! retry-with-backoff execution, bounded-parallelism dispatch, and
//! result aggregation.
//!
//! Call [`Orchestrator::run`] with a validated plan to perform one full
//! mirror pass. The actual file mirroring is delegated to an external tool
//! behind the [`ProcessRunner`] seam; this crate only interprets its exit
//! codes.

pub mod classify;
pub mod dispatch;
pub mod error;
pub mod invocation;
pub mod logger;
pub mod notify;
pub mod orchestrator;
pub mod retry;
pub mod runner;
pub mod validate;

pub use classify::classify;
pub use error::EngineError;
pub use invocation::ToolInvocation;
pub use logger::{LogStream, NullLogger, RunLogger};
pub use notify::{Notifier, NullNotifier};
pub use orchestrator::{Orchestrator, RunReport, RunState};
pub use runner::{MirrorToolRunner, ProcessRunner};
pub use validate::ValidationOutcome;
