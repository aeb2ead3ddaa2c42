//! The operator-notification collaborator interface.
//!
//! Delivery is best-effort by contract: the orchestrator calls
//! [`Notifier::notify`] and moves on. Implementations must swallow their own
//! failures — a broken toast daemon never fails a mirror run.

/// Best-effort delivery of a title + message pair to the operator.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Drops every notification. Useful as a default and in tests.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}
