use tracing::info;

/// Fire-and-forget user-facing toasts. No return value is awaited and a
/// failure to display is never retried.
pub trait Notifier: Send + Sync {
    /// Confirmation for an effective add.
    fn success(&self, message: &str);
    /// Confirmation for an effective removal (error-styled in the UI).
    fn removed(&self, message: &str);
}

/// Default notifier: surfaces toasts as log lines.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn removed(&self, message: &str) {
        info!("{}", message);
    }
}
