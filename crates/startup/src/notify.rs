//! User-facing notification contract.

/// Fire-and-forget notifications emitted by the supervisor. Nothing here is
/// persisted; hosts render the messages however they like.
pub trait Notifier: Send + Sync {
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
    fn show_info(&self, message: &str);
}

/// Default notifier: forwards every message to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn show_error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn show_info(&self, message: &str) {
        tracing::info!("{message}");
    }
}
