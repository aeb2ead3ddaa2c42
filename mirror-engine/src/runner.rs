//! The subprocess seam.
//!
//! [`ProcessRunner`] is the only point in the engine that touches a child
//! process. Everything above it (retry, validation, dispatch) is written
//! against the trait, which is what the integration tests script against.

use std::process::{Command, Stdio};

use crate::error::EngineError;
use crate::invocation::ToolInvocation;

/// Spawns one mirroring-tool child per call and waits for termination.
///
/// Blocking; callers run it under `tokio::task::spawn_blocking`. No retries
/// and no exit-code interpretation at this layer.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<i32, EngineError>;
}

/// Production runner backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct MirrorToolRunner;

impl ProcessRunner for MirrorToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<i32, EngineError> {
        let status = Command::new(invocation.tool())
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| EngineError::Spawn {
                tool: invocation.tool().to_path_buf(),
                source,
            })?;

        status.code().ok_or_else(|| EngineError::NoExitCode {
            destination: destination_of(invocation),
        })
    }
}

/// The destination is always the second argv entry (see `ToolInvocation`).
fn destination_of(invocation: &ToolInvocation) -> std::path::PathBuf {
    invocation
        .args()
        .get(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mirror_core::types::SyncPlan;

    use super::*;

    fn plan_with_tool(tool: &str) -> SyncPlan {
        SyncPlan {
            source: PathBuf::from("/tmp"),
            destinations: vec![PathBuf::from("/tmp/dest")],
            exclusions: vec![],
            tool: PathBuf::from(tool),
            tool_options: vec![],
            max_parallel_jobs: 1,
        }
    }

    #[test]
    fn missing_binary_is_a_spawn_error_not_a_verdict() {
        let plan = plan_with_tool("/nonexistent/mirroring-tool");
        let invocation = ToolInvocation::real(&plan, &plan.destinations[0]);

        let err = MirrorToolRunner
            .run(&invocation)
            .expect_err("binary does not exist");
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_is_reported_verbatim() {
        // `false` ignores its arguments and exits 1 — a stand-in for a tool
        // reporting warnings.
        let plan = plan_with_tool("false");
        let invocation = ToolInvocation::real(&plan, &plan.destinations[0]);

        let code = MirrorToolRunner.run(&invocation).expect("spawn false");
        assert_eq!(code, 1);
    }
}
