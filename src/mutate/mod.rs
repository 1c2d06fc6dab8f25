//! Item mutations against the current page
//!
//! Every change is a [`Mutation`] command. The mutator either applies it
//! before the server call and reverts it if the call fails (optimistic), or
//! applies it only once the server accepted the change (confirmed).

pub mod command;

pub use command::{Mutation, PatchItem, RemoveItem};

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiResult};
use crate::engine::ListQueryEngine;
use crate::models::{VideoId, VideoPatch};
use crate::ui::Confirmer;

/// Result of [`OptimisticMutator::delete`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The server deleted the item and it left the page
    Deleted {
        /// The page emptied and the engine stepped back one page
        page_changed: bool,
    },
    /// The user declined the prompt; nothing changed
    Cancelled,
    /// The server refused; the item is still listed
    Failed(ApiError),
}

/// Result of [`OptimisticMutator::rename`]
///
/// Returned instead of an error so callers can decide whether to keep their
/// edit affordance open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub success: bool,
    pub error: Option<ApiError>,
}

impl RenameOutcome {
    const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    const fn failed(error: ApiError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

/// Applies item mutations to a [`ListQueryEngine`]'s read model
#[derive(Clone)]
pub struct OptimisticMutator {
    engine: ListQueryEngine,
    confirmer: Arc<dyn Confirmer>,
}

impl OptimisticMutator {
    #[must_use]
    pub fn new(engine: ListQueryEngine, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { engine, confirmer }
    }

    #[must_use]
    pub const fn engine(&self) -> &ListQueryEngine {
        &self.engine
    }

    /// Delete an item after confirmation
    ///
    /// A prompt that cannot be shown counts as a refusal.
    pub async fn delete(&self, id: VideoId) -> DeleteOutcome {
        let name = self
            .engine
            .item(id)
            .map_or_else(|| format!("#{id}"), |v| v.filename);

        let prompt = format!("Delete '{name}'? This cannot be undone.");
        match self.confirmer.confirm(&prompt).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(id, "delete cancelled");
                return DeleteOutcome::Cancelled;
            }
            Err(e) => {
                warn!(id, error = %e, "confirmation failed, not deleting");
                return DeleteOutcome::Cancelled;
            }
        }

        let mut remove = RemoveItem::new(id);
        let result = self
            .run_confirmed(&mut remove, self.engine.api().delete_video(id))
            .await;
        if let Err(e) = result {
            warn!(id, error = %e, "delete failed");
            self.engine
                .notifier()
                .error(&format!("Failed to delete video: {}", e.user_message()));
            return DeleteOutcome::Failed(e);
        }

        info!(id, name = %name, "video deleted");
        self.engine.notifier().success("Video deleted");

        let page = self.engine.filter().page;
        let emptied = self.engine.read_model().is_empty();
        if emptied && page > 1 {
            debug!(id, page, "page emptied by delete, stepping back");
            // The engine reports its own fetch failures
            let _ = self.engine.change_page(page - 1).await;
            return DeleteOutcome::Deleted { page_changed: true };
        }
        DeleteOutcome::Deleted {
            page_changed: false,
        }
    }

    /// Rename an item; the listed name changes only once the server agrees
    pub async fn rename(&self, id: VideoId, new_name: &str) -> RenameOutcome {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return RenameOutcome::failed(ApiError::Rejected(
                "New name must not be empty".to_string(),
            ));
        }

        let mut patch = PatchItem::new(id, VideoPatch::filename(new_name));
        match self
            .run_confirmed(&mut patch, self.engine.api().rename_video(id, new_name))
            .await
        {
            Ok(()) => {
                info!(id, new_name, "video renamed");
                RenameOutcome::ok()
            }
            Err(e) => {
                warn!(id, error = %e, "rename failed");
                RenameOutcome::failed(e)
            }
        }
    }

    /// Set the favorite flag, showing it immediately
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server refuses; the flag is put back.
    pub async fn set_favorite(&self, id: VideoId, is_favorite: bool) -> ApiResult<()> {
        let mut patch = PatchItem::new(id, VideoPatch::favorite(is_favorite));
        let result = self
            .run_optimistic(&mut patch, self.engine.api().set_favorite(id, is_favorite))
            .await;
        if let Err(e) = &result {
            warn!(id, error = %e, "favorite update failed, reverted");
            self.engine
                .notifier()
                .error(&format!("Failed to update favorite: {}", e.user_message()));
        }
        result
    }

    /// Flip the favorite flag of a listed item
    ///
    /// Returns the new value, or `None` when the item is not on the page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server refuses.
    pub async fn toggle_favorite(&self, id: VideoId) -> ApiResult<Option<bool>> {
        let Some(item) = self.engine.item(id) else {
            return Ok(None);
        };
        let next = !item.is_favorite;
        self.set_favorite(id, next).await?;
        Ok(Some(next))
    }

    /// Set the browser-playable flag, showing it immediately
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server refuses; the flag is put back.
    pub async fn set_web_playable(&self, id: VideoId, web_playable: bool) -> ApiResult<()> {
        let mut patch = PatchItem::new(id, VideoPatch::web_playable(web_playable));
        let result = self
            .run_optimistic(
                &mut patch,
                self.engine.api().set_web_playable(id, web_playable),
            )
            .await;
        if let Err(e) = &result {
            warn!(id, error = %e, "playable update failed, reverted");
            self.engine.notifier().error(&format!(
                "Failed to update playback status: {}",
                e.user_message()
            ));
        }
        result
    }

    /// Flip the browser-playable flag of a listed item
    ///
    /// Returns the new value, or `None` when the item is not on the page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server refuses.
    pub async fn toggle_web_playable(&self, id: VideoId) -> ApiResult<Option<bool>> {
        let Some(item) = self.engine.item(id) else {
            return Ok(None);
        };
        let next = !item.web_playable;
        self.set_web_playable(id, next).await?;
        Ok(Some(next))
    }

    /// Merge fields into a listed item without calling the server
    ///
    /// Returns `false` when the item is not on the page.
    pub fn apply_patch(&self, id: VideoId, patch: &VideoPatch) -> bool {
        let mut command = PatchItem::new(id, patch.clone());
        self.engine.update_model(|model| command.apply(model))
    }

    /// Reload an item's playback progress from the server
    ///
    /// Best-effort: a missing item or a failed call only gets logged.
    pub async fn refresh_progress(&self, id: VideoId) -> bool {
        if self.engine.item(id).is_none() {
            return false;
        }
        match self.engine.api().get_progress(id).await {
            Ok(Some(snapshot)) => self.apply_patch(id, &VideoPatch::progress(&snapshot)),
            Ok(None) => false,
            Err(e) => {
                debug!(id, error = %e, "progress refresh failed");
                false
            }
        }
    }

    async fn run_optimistic<M, F>(&self, mutation: &mut M, remote: F) -> ApiResult<()>
    where
        M: Mutation,
        F: Future<Output = ApiResult<()>>,
    {
        self.engine.update_model(|model| mutation.apply(model));
        let result = remote.await;
        if result.is_err() {
            self.engine.update_model(|model| mutation.revert(model));
        }
        result
    }

    async fn run_confirmed<M, F>(&self, mutation: &mut M, remote: F) -> ApiResult<()>
    where
        M: Mutation,
        F: Future<Output = ApiResult<()>>,
    {
        remote.await?;
        self.engine.update_model(|model| mutation.apply(model));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockLibraryApi, MockOp};
    use crate::models::ProgressSnapshot;
    use crate::query::{MemoryRouter, QueryParams, RouteBackedSource};
    use crate::testing::sample_videos;
    use crate::ui::mock::ScriptedConfirmer;
    use crate::ui::{NoticeLevel, ToastQueue};

    struct Harness {
        api: Arc<MockLibraryApi>,
        toasts: ToastQueue,
        confirmer: Arc<ScriptedConfirmer>,
        mutator: OptimisticMutator,
    }

    async fn harness(api: MockLibraryApi, query: &str, answers: &[bool]) -> Harness {
        let api = Arc::new(api);
        let toasts = ToastQueue::new();
        let router = Arc::new(MemoryRouter::new(QueryParams::parse(query)));
        let engine = ListQueryEngine::builder()
            .api(api.clone())
            .source(Arc::new(RouteBackedSource::new(router)))
            .notifier(Arc::new(toasts.clone()))
            .page_size(10)
            .build()
            .unwrap();
        engine.mount().await.unwrap();
        let confirmer = Arc::new(ScriptedConfirmer::new(answers.iter().copied()));
        let mutator = OptimisticMutator::new(engine, confirmer.clone());
        Harness {
            api,
            toasts,
            confirmer,
            mutator,
        }
    }

    #[tokio::test]
    async fn test_delete_confirmed_removes_item() {
        let h = harness(MockLibraryApi::new(sample_videos(15)), "sort=filename", &[true]).await;

        let outcome = h.mutator.delete(3).await;

        assert_eq!(outcome, DeleteOutcome::Deleted { page_changed: false });
        let model = h.mutator.engine().read_model();
        assert_eq!(model.total, 14);
        assert!(model.find(3).is_none());
        assert_eq!(model.items.len(), 9);
        assert_eq!(h.confirmer.prompts(), vec!["Delete 'video-03.mp4'? This cannot be undone."]);
        assert_eq!(h.toasts.latest().unwrap().0, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_delete_cancelled_changes_nothing() {
        let h = harness(MockLibraryApi::new(sample_videos(5)), "sort=filename", &[false]).await;

        let outcome = h.mutator.delete(1).await;

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(h.api.count(MockOp::Delete), 0);
        assert_eq!(h.mutator.engine().read_model().total, 5);
        assert_eq!(h.toasts.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_item() {
        let h = harness(MockLibraryApi::new(sample_videos(5)), "sort=filename", &[true]).await;
        h.api.fail(MockOp::Delete, ApiError::status(500));

        let outcome = h.mutator.delete(2).await;

        assert_eq!(outcome, DeleteOutcome::Failed(ApiError::status(500)));
        assert!(h.mutator.engine().item(2).is_some());
        assert_eq!(h.mutator.engine().read_model().total, 5);
        assert_eq!(h.toasts.count_level(NoticeLevel::Error), 1);
    }

    #[tokio::test]
    async fn test_delete_last_item_on_page_steps_back() {
        let h = harness(
            MockLibraryApi::new(sample_videos(11)),
            "sort=filename&page=2",
            &[true],
        )
        .await;
        assert_eq!(h.mutator.engine().read_model().items.len(), 1);

        let outcome = h.mutator.delete(11).await;

        assert_eq!(outcome, DeleteOutcome::Deleted { page_changed: true });
        let engine = h.mutator.engine();
        assert_eq!(engine.filter().page, 1);
        assert_eq!(engine.read_model().items.len(), 10);
        assert_eq!(engine.read_model().total, 10);
    }

    #[tokio::test]
    async fn test_rename_patches_only_on_success() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "sort=filename", &[]).await;

        let outcome = h.mutator.rename(1, "  holiday.mp4 ").await;
        assert!(outcome.success);
        assert_eq!(h.mutator.engine().item(1).unwrap().filename, "holiday.mp4");

        let outcome = h.mutator.rename(2, "holiday.mp4").await;
        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(ApiError::Status { status: 400, .. })));
        assert_eq!(h.mutator.engine().item(2).unwrap().filename, "video-02.mp4");
        assert_eq!(h.toasts.count(), 0);
    }

    #[tokio::test]
    async fn test_rename_blank_name_skips_server() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "", &[]).await;

        let outcome = h.mutator.rename(1, "   ").await;

        assert!(!outcome.success);
        assert!(matches!(outcome.error, Some(ApiError::Rejected(_))));
        assert_eq!(h.api.count(MockOp::Rename), 0);
    }

    #[tokio::test]
    async fn test_favorite_failure_reverts() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "", &[]).await;
        h.api.fail(MockOp::Favorite, ApiError::Timeout);

        let result = h.mutator.toggle_favorite(2).await;

        assert_eq!(result, Err(ApiError::Timeout));
        assert!(!h.mutator.engine().item(2).unwrap().is_favorite);
        assert_eq!(h.toasts.count_level(NoticeLevel::Error), 1);

        h.api.recover(MockOp::Favorite);
        assert_eq!(h.mutator.toggle_favorite(2).await, Ok(Some(true)));
        assert!(h.mutator.engine().item(2).unwrap().is_favorite);
        assert_eq!(h.mutator.toggle_favorite(99).await, Ok(None));
    }

    #[tokio::test]
    async fn test_web_playable_failure_reverts() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "", &[]).await;
        assert!(h.mutator.engine().item(1).unwrap().web_playable);
        h.api.fail(MockOp::WebPlayable, ApiError::status(500));

        let result = h.mutator.toggle_web_playable(1).await;

        assert_eq!(result, Err(ApiError::status(500)));
        assert!(h.mutator.engine().item(1).unwrap().web_playable);
        assert!(h.api.videos()[0].web_playable);
        assert_eq!(h.toasts.count_level(NoticeLevel::Error), 1);

        h.api.recover(MockOp::WebPlayable);
        assert_eq!(h.mutator.toggle_web_playable(1).await, Ok(Some(false)));
        assert!(!h.mutator.engine().item(1).unwrap().web_playable);
        assert!(!h.api.videos()[0].web_playable);
    }

    #[tokio::test]
    async fn test_refresh_progress_patches_fields() {
        let snapshot = ProgressSnapshot {
            last_position: 42.0,
            watch_progress: 0.5,
            is_completed: false,
            last_watched_at: None,
        };
        let api = MockLibraryApi::new(sample_videos(3)).with_progress(2, snapshot);
        let h = harness(api, "", &[]).await;

        assert!(h.mutator.refresh_progress(2).await);
        let item = h.mutator.engine().item(2).unwrap();
        assert!((item.last_position - 42.0).abs() < f64::EPSILON);
        assert!((item.watch_progress - 0.5).abs() < f64::EPSILON);

        // No stored progress, and an item that is not listed
        assert!(!h.mutator.refresh_progress(1).await);
        assert!(!h.mutator.refresh_progress(77).await);
    }

    #[tokio::test]
    async fn test_refresh_progress_swallows_errors() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "", &[]).await;
        h.api.fail(MockOp::GetProgress, ApiError::status(500));

        assert!(!h.mutator.refresh_progress(1).await);
        assert_eq!(h.toasts.count(), 0);
    }

    #[tokio::test]
    async fn test_apply_patch_without_server() {
        let h = harness(MockLibraryApi::new(sample_videos(3)), "", &[]).await;
        h.api.clear_calls();

        assert!(h.mutator.apply_patch(3, &VideoPatch::cover("covers/x.jpg")));
        assert!(!h.mutator.apply_patch(30, &VideoPatch::cover("covers/x.jpg")));
        assert_eq!(
            h.mutator.engine().item(3).unwrap().cover.as_deref(),
            Some("covers/x.jpg")
        );
        assert!(h.api.calls().is_empty());
    }
}
