//! Settings shared between views that may change at any time

use std::sync::Arc;

use tokio::sync::watch;

use crate::query::DEFAULT_PAGE_SIZE;

/// Shared page-size preference
///
/// Every list engine subscribed to it picks up a new value on its next fetch.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    page_size: Arc<watch::Sender<u32>>,
}

impl SharedSettings {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        let (tx, _) = watch::channel(page_size.max(1));
        Self {
            page_size: Arc::new(tx),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        *self.page_size.borrow()
    }

    /// Publish a new page size; zero is raised to one
    pub fn set_page_size(&self, page_size: u32) {
        self.page_size.send_replace(page_size.max(1));
    }

    #[must_use]
    pub fn subscribe_page_size(&self) -> watch::Receiver<u32> {
        self.page_size.subscribe()
    }
}

impl Default for SharedSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_see_updates() {
        let settings = SharedSettings::default();
        let mut rx = settings.subscribe_page_size();
        assert_eq!(*rx.borrow_and_update(), DEFAULT_PAGE_SIZE);

        settings.set_page_size(50);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 50);
    }

    #[test]
    fn test_zero_is_clamped() {
        let settings = SharedSettings::new(0);
        assert_eq!(settings.page_size(), 1);
        settings.set_page_size(0);
        assert_eq!(settings.page_size(), 1);
    }
}
