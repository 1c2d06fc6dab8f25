//! What a list view renders

use crate::models::{VideoId, VideoSummary};

/// Current result page plus loading flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListReadModel {
    pub items: Vec<VideoSummary>,
    /// Matches across all pages, as reported by the server
    pub total: u64,
    pub loading: bool,
}

impl ListReadModel {
    #[must_use]
    pub fn find(&self, id: VideoId) -> Option<&VideoSummary> {
        self.items.iter().find(|v| v.id == id)
    }

    pub fn find_mut(&mut self, id: VideoId) -> Option<&mut VideoSummary> {
        self.items.iter_mut().find(|v| v.id == id)
    }

    #[must_use]
    pub fn position(&self, id: VideoId) -> Option<usize> {
        self.items.iter().position(|v| v.id == id)
    }

    /// Remove an item by identity, returning where it was
    pub fn remove(&mut self, id: VideoId) -> Option<(usize, VideoSummary)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Put an item back at `index`, or at the end if the page shrank
    pub fn insert_at(&mut self, index: usize, item: VideoSummary) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `ceil(total / page_size)`
    #[must_use]
    pub fn total_pages(&self, page_size: u32) -> u64 {
        self.total.div_ceil(u64::from(page_size.max(1)))
    }
}
