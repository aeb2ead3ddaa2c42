//! Best-effort operator notifications.
//!
//! A priority-ordered chain of delivery backends: desktop toast where a
//! desktop is reachable, then a terminal bell, then a plain log line. The
//! first available backend that delivers wins. Every failure is swallowed —
//! the orchestrator only ever sees the `Notifier` interface.

use std::io::Write;
use std::process::{Command, Stdio};

use mirror_engine::notify::Notifier;

/// One way of reaching the operator.
trait NotifyBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    /// Returns `true` on (apparent) delivery.
    fn send(&self, title: &str, message: &str) -> bool;
}

/// Desktop toast via `notify-send` (Linux) or `osascript` (macOS).
struct DesktopToast;

impl NotifyBackend for DesktopToast {
    fn name(&self) -> &'static str {
        "desktop-toast"
    }

    #[cfg(target_os = "linux")]
    fn is_available(&self) -> bool {
        std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
    }

    #[cfg(target_os = "macos")]
    fn is_available(&self) -> bool {
        true
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn is_available(&self) -> bool {
        false
    }

    #[cfg(target_os = "linux")]
    fn send(&self, title: &str, message: &str) -> bool {
        spawn_quiet(Command::new("notify-send").arg(title).arg(message))
    }

    #[cfg(target_os = "macos")]
    fn send(&self, title: &str, message: &str) -> bool {
        // Both strings are passed as arguments, never interpolated into the
        // script, so quoting in titles cannot break out.
        spawn_quiet(
            Command::new("osascript")
                .arg("-e")
                .arg("on run argv\ndisplay notification (item 2 of argv) with title (item 1 of argv)\nend run")
                .arg(title)
                .arg(message),
        )
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn send(&self, _title: &str, _message: &str) -> bool {
        false
    }
}

/// ASCII BEL on stderr — audible wherever the run is attended.
struct TerminalBell;

impl NotifyBackend for TerminalBell {
    fn name(&self) -> &'static str {
        "terminal-bell"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send(&self, title: &str, message: &str) -> bool {
        let mut stderr = std::io::stderr();
        writeln!(stderr, "\x07{title}: {message}").is_ok()
    }
}

/// Last resort: the notification becomes a tracing event.
struct LogLine;

impl NotifyBackend for LogLine {
    fn name(&self) -> &'static str {
        "log-line"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send(&self, title: &str, message: &str) -> bool {
        tracing::info!(title, message, "operator notification");
        true
    }
}

fn spawn_quiet(command: &mut Command) -> bool {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Priority-ordered notification chain.
pub struct NotifierChain {
    backends: Vec<Box<dyn NotifyBackend>>,
}

impl NotifierChain {
    /// The default chain: toast, bell, log line.
    pub fn detect() -> Self {
        Self {
            backends: vec![Box::new(DesktopToast), Box::new(TerminalBell), Box::new(LogLine)],
        }
    }
}

impl Notifier for NotifierChain {
    fn notify(&self, title: &str, message: &str) {
        for backend in &self.backends {
            if !backend.is_available() {
                continue;
            }
            if backend.send(title, message) {
                tracing::debug!(backend = backend.name(), "notification delivered");
                return;
            }
        }
        // Unreachable in practice: LogLine always accepts. Kept so a future
        // reordering of the chain cannot silently drop notifications.
        tracing::warn!(title, "no notification backend accepted the message");
    }
}
