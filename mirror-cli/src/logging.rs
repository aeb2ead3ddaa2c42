//! File-backed implementation of the engine's log-sink interface.
//!
//! Three append-only files under one directory — `run.log`, `error.log`,
//! `test.log` — each line prefixed with a local timestamp. Before every
//! append the target file is rotated if it exceeds 10 MiB, keeping at most
//! 5 numbered backups:
//!   run.log → run.log.1 → run.log.2 → … → run.log.5
//!
//! Writes are best-effort: a failed append is downgraded to a warning so a
//! full disk never fails a mirror run.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

use mirror_engine::logger::{LogStream, RunLogger};

/// Maximum log file size before rotation (10 MiB).
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of rotated backup files to keep per stream.
pub const MAX_ROTATED_FILES: usize = 5;

/// The three named log streams under a single directory.
pub struct FileLogs {
    dir: PathBuf,
    // Serializes rotate-then-append so concurrent workers cannot interleave
    // a rotation with another worker's write.
    guard: Mutex<()>,
}

impl FileLogs {
    /// Create the log directory (and parents) if needed.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            guard: Mutex::new(()),
        })
    }

    pub fn stream_path(&self, stream: LogStream) -> PathBuf {
        self.dir.join(format!("{}.log", stream.as_str()))
    }

    fn append(&self, stream: LogStream, message: &str) -> io::Result<()> {
        let path = self.stream_path(stream);
        let _guard = self.guard.lock().unwrap_or_else(|poisoned| {
            // A panicked writer leaves the files themselves intact.
            poisoned.into_inner()
        });

        if rotate_if_needed(&path, MAX_LOG_BYTES, MAX_ROTATED_FILES)? {
            tracing::info!(path = %path.display(), "log file rotated");
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{stamp}] {message}")
    }
}

impl RunLogger for FileLogs {
    fn line(&self, stream: LogStream, message: &str) {
        if let Err(err) = self.append(stream, message) {
            tracing::warn!(
                stream = %stream,
                error = %err,
                "dropping log line after write failure",
            );
        }
    }
}

/// Rotate `log_path` if its size exceeds `max_bytes`.
///
/// Oldest backup is deleted, the rest shift up by one, the live file
/// becomes `.1`. Returns `true` if rotation occurred; a missing file is
/// silently skipped.
pub fn rotate_if_needed(log_path: &Path, max_bytes: u64, max_files: usize) -> io::Result<bool> {
    let size = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if size < max_bytes {
        return Ok(false);
    }

    let oldest = numbered_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for n in (1..max_files).rev() {
        let src = numbered_path(log_path, n);
        if src.exists() {
            fs::rename(&src, numbered_path(log_path, n + 1))?;
        }
    }
    fs::rename(log_path, numbered_path(log_path, 1))?;
    Ok(true)
}

fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let name = base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("run.log");
    base.with_file_name(format!("{name}.{n}"))
}
