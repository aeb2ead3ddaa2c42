//! Mirror core library — plan types, configuration loading, errors.
//!
//! Public API surface:
//! - [`types`] — [`SyncPlan`] and [`RetryPolicy`]
//! - [`config`] — JSON config loading / validation
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, MirrorConfig};
pub use error::ConfigError;
pub use types::{ExecutionResult, RetryPolicy, SyncPlan, Verdict};
