//! Outbound mail at its interface boundary.

use parking_lot::Mutex;
use tracing::info;

/// Delivers out-of-band messages to account holders. Mail transport
/// lives behind this trait; the core never speaks SMTP itself.
pub trait Notifier: Send + Sync {
    /// Attempts delivery, reporting whether it succeeded.
    fn notify(&self, email: &str, subject: &str, body: &str) -> bool;
}

/// A notifier that writes to the log instead of the network. The
/// default when no mail transport is configured.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, email: &str, subject: &str, _body: &str) -> bool {
        info!(email, subject, "notification logged in lieu of delivery");
        true
    }
}

/// Captures deliveries for assertions. Test support.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, String, String)>>,
    /// When false, every delivery reports failure.
    pub deliverable: std::sync::atomic::AtomicBool,
}

impl RecordingNotifier {
    /// A recorder whose deliveries succeed.
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            deliverable: std::sync::atomic::AtomicBool::new(true),
        }
    }

    /// Everything delivered so far, as `(email, subject, body)`.
    pub fn deliveries(&self) -> Vec<(String, String, String)> {
        self.deliveries.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, email: &str, subject: &str, body: &str) -> bool {
        if !self.deliverable.load(std::sync::atomic::Ordering::Relaxed) {
            return false;
        }
        self.deliveries
            .lock()
            .push((email.to_string(), subject.to_string(), body.to_string()));
        true
    }
}
