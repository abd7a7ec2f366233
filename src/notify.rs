//! Whole-operation notifications (the "toast" surface).

/// Receives user-facing success and failure notices.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "user_admin::notify", "{message}");
    }

    fn failure(&self, message: &str) {
        tracing::warn!(target: "user_admin::notify", "{message}");
    }
}
