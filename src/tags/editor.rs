//! Per-video tag input with a debounce window
//!
//! Each edit restarts that video's timer. Only when the window passes
//! without a further edit is the input normalised and sent, so a burst of
//! keystrokes costs one request. A request that already left is never
//! cancelled; only pending timers are.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::dedupe::dedupe_tags;
use crate::api::ApiResult;
use crate::models::{TagId, VideoId, VideoPatch};
use crate::mutate::OptimisticMutator;

/// Default quiet period before an edit is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Text of one video's tag input, shared with whoever renders it
#[derive(Debug, Clone, Default)]
pub struct TagField {
    text: Arc<Mutex<String>>,
}

impl TagField {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(Mutex::new(text.into())),
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }
}

struct PendingEdit {
    generation: u64,
    handle: JoinHandle<()>,
}

struct EditorInner {
    mutator: OptimisticMutator,
    window: Duration,
    timers: Mutex<HashMap<VideoId, PendingEdit>>,
    next_generation: AtomicU64,
    /// Edits that are waiting or being sent
    outstanding: watch::Sender<usize>,
    /// Result of the last sent edit per video, until taken
    outcomes: Mutex<HashMap<VideoId, ApiResult<()>>>,
}

impl EditorInner {
    /// Claim the timer entry if it still belongs to `generation`
    fn take_if_current(&self, id: VideoId, generation: u64) -> bool {
        let mut timers = self.timers.lock();
        match timers.get(&id) {
            Some(pending) if pending.generation == generation => {
                timers.remove(&id);
                true
            }
            _ => false,
        }
    }

    fn finish_one(&self) {
        self.outstanding.send_modify(|n| *n = n.saturating_sub(1));
    }

    async fn commit(&self, id: VideoId, field: &TagField) -> ApiResult<()> {
        let names = dedupe_tags(&field.text());
        field.set_text(names.join(","));
        debug!(id, tags = ?names, "sending tag edit");

        let engine = self.mutator.engine();
        let result = async {
            let ids = self.resolve(&names).await?;
            engine.api().set_video_tags(id, &ids).await
        }
        .await;

        match &result {
            Ok(()) => {
                self.mutator.apply_patch(id, &VideoPatch::tags(names));
                info!(id, "tags updated");
                engine.notifier().success("Tags updated");
                if let Err(e) = engine.refresh_vocabulary().await {
                    warn!(error = %e, "could not refresh tag vocabulary");
                }
            }
            Err(e) => {
                warn!(id, error = %e, "tag update failed");
                engine
                    .notifier()
                    .error(&format!("Failed to update tags: {}", e.user_message()));
            }
        }
        result
    }

    /// Map names to ids, creating tags the server does not know yet
    async fn resolve(&self, names: &[String]) -> ApiResult<Vec<TagId>> {
        let engine = self.mutator.engine();
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let known = engine.vocabulary().read().find_by_name(name).map(|t| t.id);
            let id = match known {
                Some(id) => id,
                None => {
                    let tag = engine.api().create_tag(name).await?;
                    debug!(id = tag.id, name = %tag.name, "created tag");
                    let id = tag.id;
                    engine.vocabulary().write().insert(tag);
                    id
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Debounces tag edits per video
///
/// Cheap to clone; clones share the timer table.
#[derive(Clone)]
pub struct DebouncedTagEditor {
    inner: Arc<EditorInner>,
}

impl DebouncedTagEditor {
    #[must_use]
    pub fn new(mutator: OptimisticMutator) -> Self {
        Self::with_window(mutator, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_window(mutator: OptimisticMutator, window: Duration) -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            inner: Arc::new(EditorInner {
                mutator,
                window,
                timers: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                outstanding,
                outcomes: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Record an edit of `id`'s tag input and (re)start its timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn edit(&self, id: VideoId, field: TagField) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut timers = self.inner.timers.lock();

        match timers.remove(&id) {
            Some(previous) => {
                previous.handle.abort();
                debug!(id, "tag edit timer restarted");
            }
            None => self.inner.outstanding.send_modify(|n| *n += 1),
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.window).await;
            if !inner.take_if_current(id, generation) {
                return;
            }
            let result = inner.commit(id, &field).await;
            inner.outcomes.lock().insert(id, result);
            inner.finish_one();
        });

        timers.insert(id, PendingEdit { generation, handle });
    }

    /// Drop a pending edit; returns whether one was waiting
    pub fn cancel(&self, id: VideoId) -> bool {
        let Some(pending) = self.inner.timers.lock().remove(&id) else {
            return false;
        };
        pending.handle.abort();
        self.inner.finish_one();
        true
    }

    /// Whether `id` has an edit waiting for its timer
    #[must_use]
    pub fn is_pending(&self, id: VideoId) -> bool {
        self.inner.timers.lock().contains_key(&id)
    }

    /// Result of the last edit of `id` that was sent, if not taken yet
    ///
    /// Failures were already reported through the notifier.
    pub fn take_outcome(&self, id: VideoId) -> Option<ApiResult<()>> {
        self.inner.outcomes.lock().remove(&id)
    }

    /// Wait until every pending and in-flight edit has finished
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close here
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}
