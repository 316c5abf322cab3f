use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// User-facing notification channel. Fire-and-forget: implementations must
/// not fail and callers never consume a return value.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, description: &str, severity: Severity);
}

/// Default notifier, routes notifications into the log stream.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, description: &str, severity: Severity) {
        match severity {
            Severity::Info => info!("🔔 {}: {}", title, description),
            Severity::Error => warn!("🔔 {}: {}", title, description),
        }
    }
}
