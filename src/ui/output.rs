//! User-visible notices
//!
//! Components report outcomes through the [`Notifier`] trait and never print
//! directly. The CLI uses [`TerminalNotifier`]; embedders that render their
//! own toasts can use [`ToastQueue`], which buffers notices with a lifetime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;
use parking_lot::Mutex;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Sink for transient user-facing messages
///
/// # Examples
///
/// ```
/// use vidshelf::ui::output::{Notifier, ToastQueue};
///
/// let toasts = ToastQueue::new();
/// toasts.success("Video deleted");
/// toasts.error("Network timeout, please check your connection");
/// assert_eq!(toasts.count(), 2);
/// ```
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Colored notices on stdout/stderr
pub struct TerminalNotifier {
    quiet: bool,
}

impl TerminalNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    /// Only warnings and errors are printed in quiet mode
    #[must_use]
    pub const fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => eprintln!("{} {}", "❌".red(), message),
            NoticeLevel::Warning => eprintln!("{} {}", "⚠️".yellow(), message),
            NoticeLevel::Success if !self.quiet => println!("{} {}", "✓".green(), message),
            NoticeLevel::Info if !self.quiet => println!("{}", message.dimmed()),
            NoticeLevel::Success | NoticeLevel::Info => {}
        }
    }
}

const MAX_BUFFERED: usize = 100;

/// Buffered notices that expire after a lifetime
#[derive(Clone)]
pub struct ToastQueue {
    notices: Arc<Mutex<Vec<(NoticeLevel, String, Instant)>>>,
    ttl: Duration,
}

impl ToastQueue {
    /// Queue whose notices live for 3 seconds
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3))
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notices: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    /// Notices that have not expired, oldest first
    #[must_use]
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        let now = Instant::now();
        self.notices
            .lock()
            .iter()
            .filter(|(_, _, at)| now.duration_since(*at) < self.ttl)
            .map(|(level, msg, _)| (*level, msg.clone()))
            .collect()
    }

    #[must_use]
    pub fn latest(&self) -> Option<(NoticeLevel, String)> {
        self.notices().pop()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.notices().len()
    }

    /// Number of live notices at `level`
    #[must_use]
    pub fn count_level(&self, level: NoticeLevel) -> usize {
        self.notices().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let mut notices = self.notices.lock();
        notices.push((level, message.to_string(), Instant::now()));

        if notices.len() > MAX_BUFFERED {
            notices.drain(0..MAX_BUFFERED / 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_queue_keeps_order_and_levels() {
        let toasts = ToastQueue::new();

        toasts.success("Saved");
        toasts.error("Failed");
        toasts.warning("Careful");

        let notices = toasts.notices();
        assert_eq!(notices.len(), 3);
        assert_eq!(notices[0], (NoticeLevel::Success, "Saved".to_string()));
        assert_eq!(notices[1].0, NoticeLevel::Error);
        assert_eq!(toasts.latest().unwrap().1, "Careful");
        assert_eq!(toasts.count_level(NoticeLevel::Error), 1);
    }

    #[test]
    fn test_toast_queue_expires() {
        let toasts = ToastQueue::with_ttl(Duration::from_millis(50));
        toasts.info("Loading");
        assert_eq!(toasts.count(), 1);

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(toasts.count(), 0);
    }

    #[test]
    fn test_toast_queue_is_bounded() {
        let toasts = ToastQueue::new();
        for i in 0..=MAX_BUFFERED {
            toasts.info(&format!("notice {i}"));
        }
        assert_eq!(toasts.count(), MAX_BUFFERED + 1 - MAX_BUFFERED / 2);
    }

    #[test]
    fn test_clones_share_the_buffer() {
        let toasts = ToastQueue::new();
        let handle = toasts.clone();
        handle.error("Boom");
        assert_eq!(toasts.count(), 1);

        toasts.clear();
        assert_eq!(handle.count(), 0);
    }

    #[test]
    fn test_terminal_notifier_creation() {
        let _notifier = TerminalNotifier::new();
        let _quiet = TerminalNotifier::quiet(true);
    }
}
