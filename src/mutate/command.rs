//! Reversible edits of the read model

use crate::engine::ListReadModel;
use crate::models::{VideoId, VideoPatch, VideoSummary};

/// A local change that can be undone
///
/// `apply` records whatever `revert` needs. Reverting a mutation that never
/// applied does nothing.
pub trait Mutation: Send {
    /// Apply the change; returns `false` when the target is not on the page
    fn apply(&mut self, model: &mut ListReadModel) -> bool;

    fn revert(&mut self, model: &mut ListReadModel);
}

/// Drop an item from the page and decrement the total
#[derive(Debug, Clone)]
pub struct RemoveItem {
    id: VideoId,
    removed: Option<(usize, VideoSummary)>,
}

impl RemoveItem {
    #[must_use]
    pub const fn new(id: VideoId) -> Self {
        Self { id, removed: None }
    }
}

impl Mutation for RemoveItem {
    fn apply(&mut self, model: &mut ListReadModel) -> bool {
        match model.remove(self.id) {
            Some(removed) => {
                model.total = model.total.saturating_sub(1);
                self.removed = Some(removed);
                true
            }
            None => false,
        }
    }

    fn revert(&mut self, model: &mut ListReadModel) {
        if let Some((index, item)) = self.removed.take() {
            model.insert_at(index, item);
            model.total += 1;
        }
    }
}

/// Merge a [`VideoPatch`] into one item
#[derive(Debug, Clone)]
pub struct PatchItem {
    id: VideoId,
    patch: VideoPatch,
    inverse: Option<VideoPatch>,
}

impl PatchItem {
    #[must_use]
    pub const fn new(id: VideoId, patch: VideoPatch) -> Self {
        Self {
            id,
            patch,
            inverse: None,
        }
    }
}

impl Mutation for PatchItem {
    fn apply(&mut self, model: &mut ListReadModel) -> bool {
        match model.find_mut(self.id) {
            Some(item) => {
                self.inverse = Some(item.apply_patch(&self.patch));
                true
            }
            None => false,
        }
    }

    fn revert(&mut self, model: &mut ListReadModel) {
        let Some(inverse) = self.inverse.take() else {
            return;
        };
        if let Some(item) = model.find_mut(self.id) {
            item.apply_patch(&inverse);
        }
    }
}
