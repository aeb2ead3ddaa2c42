//! JSON configuration loading and validation.
//!
//! The on-disk document keeps the PascalCase field names the operators
//! already use (`SourceDir`, `DestDirs`, ...). Loading produces a validated
//! [`MirrorConfig`] — an immutable [`SyncPlan`] plus the retry policy and
//! the log directory for the host's file logger.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{io_err, ConfigError};
use crate::types::{RetryPolicy, SyncPlan};

/// Tool flags used when the config does not specify `Options`.
pub const DEFAULT_TOOL_OPTIONS: &str = "/MIR /Z /R:5 /W:10 /MT:32";

/// Default concurrently mirroring destinations.
pub const DEFAULT_MAX_PARALLEL_JOBS: usize = 2;

/// Default mirroring tool binary, resolved via `PATH`.
pub const DEFAULT_TOOL: &str = "robocopy";

/// Validated configuration for one mirror run.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub plan: SyncPlan,
    pub retry: RetryPolicy,
    /// Directory receiving the `run` / `error` / `test` log streams.
    pub log_dir: PathBuf,
}

/// Raw on-disk document, prior to validation.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(rename = "SourceDir")]
    source_dir: PathBuf,
    #[serde(rename = "DestDirs")]
    dest_dirs: Vec<PathBuf>,
    #[serde(rename = "Exclusions")]
    exclusions: Vec<String>,
    #[serde(rename = "Options")]
    options: Option<String>,
    #[serde(rename = "MaxParallelJobs")]
    max_parallel_jobs: Option<usize>,
    #[serde(rename = "ToolPath")]
    tool_path: Option<PathBuf>,
    #[serde(rename = "LogDir")]
    log_dir: Option<PathBuf>,
    #[serde(rename = "MaxRetries")]
    max_retries: Option<u32>,
    #[serde(rename = "RetryDelaySeconds")]
    retry_delay_seconds: Option<u64>,
    #[serde(rename = "BackoffMultiplier")]
    backoff_multiplier: Option<f64>,
}

/// Load and validate the config file at `path`.
///
/// # Errors
/// [`ConfigError`] on unreadable/malformed JSON, an empty `DestDirs`,
/// a nonexistent `SourceDir`, or out-of-range numeric fields.
pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let raw: RawConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(raw)
}

fn validate(raw: RawConfig) -> Result<MirrorConfig, ConfigError> {
    if raw.dest_dirs.is_empty() {
        return Err(ConfigError::NoDestinations);
    }
    if !raw.source_dir.exists() {
        return Err(ConfigError::SourceMissing {
            path: raw.source_dir,
        });
    }

    let max_parallel_jobs = raw.max_parallel_jobs.unwrap_or(DEFAULT_MAX_PARALLEL_JOBS);
    if max_parallel_jobs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "MaxParallelJobs",
            reason: "must be at least 1".to_string(),
        });
    }

    let backoff_multiplier = raw.backoff_multiplier.unwrap_or(2.0);
    if backoff_multiplier <= 1.0 {
        return Err(ConfigError::InvalidValue {
            field: "BackoffMultiplier",
            reason: format!("must be greater than 1, got {backoff_multiplier}"),
        });
    }

    let retry_delay_seconds = raw.retry_delay_seconds.unwrap_or(5);
    if retry_delay_seconds == 0 {
        return Err(ConfigError::InvalidValue {
            field: "RetryDelaySeconds",
            reason: "must be at least 1".to_string(),
        });
    }

    let options = raw
        .options
        .unwrap_or_else(|| DEFAULT_TOOL_OPTIONS.to_string());
    let tool_options = split_options(&options);

    let plan = SyncPlan {
        source: raw.source_dir,
        destinations: raw.dest_dirs,
        exclusions: raw.exclusions,
        tool: raw.tool_path.unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL)),
        tool_options,
        max_parallel_jobs,
    };

    let retry = RetryPolicy {
        max_retries: raw.max_retries.unwrap_or(3),
        initial_delay: Duration::from_secs(retry_delay_seconds),
        backoff_multiplier,
    };

    Ok(MirrorConfig {
        plan,
        retry,
        log_dir: raw.log_dir.unwrap_or_else(|| PathBuf::from("logs")),
    })
}

/// Split a space-separated options string into discrete flags.
///
/// Collapses runs of whitespace; an empty string yields no flags.
fn split_options(options: &str) -> Vec<String> {
    options
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
