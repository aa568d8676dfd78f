//! Delivery of limit-exceeded messages to the user. The accounting path only decides when
//! to fire and what to say; [Notifier] abstracts how the message reaches the user.

use tracing::info;

/// Intended to serve as a contract every delivery mechanism must implement.
///
/// Delivery is assumed to succeed from the caller's perspective. Backends swallow and log
/// their own failures instead of propagating them into the accounting path.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + 'static {
    fn notify(&mut self, title: &str, message: &str);
}

/// Serves as a cross-compatible Notifier implementation.
pub struct GenericNotifier {
    inner: Box<dyn Notifier>,
}

impl GenericNotifier {
    pub fn new() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(unix)] {
                Self {
                    inner: Box::new(DesktopNotifier),
                }
            }
            else {
                Self {
                    inner: Box::new(LogNotifier),
                }
            }
        }
    }
}

impl Notifier for GenericNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        self.inner.notify(title, message)
    }
}

/// Shows a desktop popup through `notify-send`.
#[cfg(unix)]
pub struct DesktopNotifier;

#[cfg(unix)]
impl Notifier for DesktopNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        use tracing::error;

        let result = std::process::Command::new("notify-send")
            .arg(title)
            .arg(message)
            .status();
        match result {
            Ok(status) if status.success() => {}
            Ok(status) => error!("notify-send exited with {status}"),
            Err(e) => error!("Failed to spawn notify-send {e:?}"),
        }
    }
}

/// Fallback that surfaces the message in the daemon log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        info!("{title}: {message}");
    }
}
