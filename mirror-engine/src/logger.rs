//! The log-sink collaborator interface.
//!
//! The engine reports what it does through [`RunLogger`] and never opens a
//! log file itself. The host decides where the three streams live and how
//! they rotate; tests record lines in memory.

use std::fmt;

/// Named append-only log streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    /// Real-run progress: attempts, retries, per-destination outcomes.
    Run,
    /// Failures and unexpected faults.
    Error,
    /// Dry-run validation output, kept separate for easy diffing.
    Test,
}

impl LogStream {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStream::Run => "run",
            LogStream::Error => "error",
            LogStream::Test => "test",
        }
    }
}

impl fmt::Display for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only sink for timestamped text lines. Best-effort: implementations
/// swallow their own write failures.
pub trait RunLogger: Send + Sync {
    fn line(&self, stream: LogStream, message: &str);
}

/// Discards every line. Useful as a default and in tests.
#[derive(Debug, Default)]
pub struct NullLogger;

impl RunLogger for NullLogger {
    fn line(&self, _stream: LogStream, _message: &str) {}
}
