//! Error types for mirror-engine.
//!
//! Failure exit codes from the mirroring tool are never errors — they are
//! classified into verdicts. [`EngineError`] covers only faults outside the
//! modeled control flow; the orchestrator catches them once at its boundary
//! and terminates the run in a failed state.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The mirroring tool binary could not be launched at all.
    #[error("failed to launch mirroring tool {tool}: {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The child terminated without an exit code (killed by a signal).
    #[error("mirroring tool terminated without an exit code for {destination}")]
    NoExitCode { destination: PathBuf },

    /// A worker task panicked or was aborted.
    #[error("worker task join failure: {0}")]
    Join(String),

    /// The result channel closed before every destination reported.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),
}
