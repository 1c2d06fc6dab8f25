//! List query engine
//!
//! Owns the filter/sort/page state of one list view, turns it into server
//! requests and exposes the resulting read model:
//! ```no_run
//! use std::sync::Arc;
//! use vidshelf::api::MockLibraryApi;
//! use vidshelf::engine::ListQueryEngine;
//! use vidshelf::query::{FilterPatch, MemoryRouter, RouteBackedSource, SortMode};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Arc::new(MemoryRouter::default());
//! let engine = ListQueryEngine::builder()
//!     .api(Arc::new(MockLibraryApi::default()))
//!     .source(Arc::new(RouteBackedSource::new(router)))
//!     .build()?;
//!
//! engine.mount().await?;
//! engine.set_filter(FilterPatch::default().sort(SortMode::Size)).await?;
//! println!("{} videos", engine.read_model().total);
//! # Ok(())
//! # }
//! ```
//!
//! Every fetch takes a sequence number; a response that arrives after a newer
//! fetch was issued is dropped, so the read model always reflects the latest
//! request.

pub mod error;
pub mod read_model;

pub use error::EngineError;
pub use read_model::ListReadModel;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiResult, LibraryApi, ListRequest};
use crate::models::{VideoId, VideoSummary};
use crate::prefs::{MemoryPreferences, PreferenceStore};
use crate::query::{FilterPatch, FilterState, SourceUpdate, StateSource, ViewMode};
use crate::seed::SeedController;
use crate::settings::SharedSettings;
use crate::tags::{TagVocabulary, VocabularyDiff};
use crate::ui::{Notifier, ToastQueue};

/// What happened to a fetch's response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the read model
    Applied { total: u64 },
    /// A newer fetch was issued meanwhile; the response was dropped
    Superseded,
}

struct EngineInner {
    api: Arc<dyn LibraryApi>,
    source: Arc<dyn StateSource>,
    prefs: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    vocabulary: Arc<RwLock<TagVocabulary>>,
    filter: Mutex<FilterState>,
    seeds: Mutex<SeedController>,
    model: RwLock<ListReadModel>,
    page_size: Mutex<Option<watch::Receiver<u32>>>,
    issued: AtomicU64,
}

/// Filter state holder and fetch coordinator for one list view
///
/// Cheap to clone; clones share state. Use [`ListQueryEngine::builder`] to
/// construct.
#[derive(Clone)]
pub struct ListQueryEngine {
    inner: Arc<EngineInner>,
}

impl ListQueryEngine {
    #[must_use]
    pub fn builder() -> ListQueryEngineBuilder {
        ListQueryEngineBuilder::new()
    }

    /// Initialise state from the source and preferences, then fetch
    ///
    /// Draws the first random seed and loads the tag vocabulary. A failed
    /// vocabulary load is logged and does not prevent the fetch.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the initial list call fails.
    pub async fn mount(&self) -> ApiResult<FetchOutcome> {
        let view_mode = match self.inner.prefs.view_mode() {
            Ok(mode) => mode.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not read view mode preference");
                ViewMode::default()
            }
        };

        let page_size = self.inner.filter.lock().page_size;
        let base = FilterState {
            page_size,
            view_mode,
            ..FilterState::default()
        };
        let mut state = self.inner.source.load(&base);
        state.random_seed = self.inner.seeds.lock().draw();
        debug!(query = ?state, "mounting list engine");
        *self.inner.filter.lock() = state;

        if let Err(e) = self.refresh_vocabulary().await {
            warn!(error = %e, "could not load tag vocabulary");
        }

        self.fetch().await
    }

    /// Merge a partial filter change and fetch from the first page
    ///
    /// The seed is re-drawn only when sorting newly became random.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn set_filter(&self, patch: FilterPatch) -> ApiResult<FetchOutcome> {
        self.apply(&patch, 1);
        self.fetch().await
    }

    /// Request the current page from the server and replace the read model
    ///
    /// Keyword, favorites, tags and duration are sent only when set; the
    /// seed only in random mode. On failure the read model keeps its last
    /// content and an error notice is shown. `loading` is cleared either way.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn fetch(&self) -> ApiResult<FetchOutcome> {
        self.sync_page_size();

        let request = ListRequest::from_state(&self.inner.filter.lock());
        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.model.write().loading = true;
        debug!(
            seq,
            skip = request.skip,
            limit = request.limit,
            sort = %request.sort_by,
            "fetching page"
        );

        let result = self.inner.api.list(&request).await;

        if self.inner.issued.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding superseded response");
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                let total = page.total;
                {
                    let mut model = self.inner.model.write();
                    model.items = page.items;
                    model.total = total;
                    model.loading = false;
                }
                let snapshot = self.inner.filter.lock().clone();
                self.inner.source.mirror(&snapshot);
                debug!(seq, total, "page applied");
                Ok(FetchOutcome::Applied { total })
            }
            Err(e) => {
                self.inner.model.write().loading = false;
                warn!(seq, error = %e, "failed to load videos");
                self.inner.notifier.error(&format!(
                    "Failed to load videos: {}",
                    e.user_message()
                ));
                Err(e)
            }
        }
    }

    /// Move to page `page` (raised to 1) keeping the filters
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn change_page(&self, page: u32) -> ApiResult<FetchOutcome> {
        self.inner.filter.lock().page = page.max(1);
        self.fetch().await
    }

    /// Change the page size (raised to 1) and go back to the first page
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn change_page_size(&self, page_size: u32) -> ApiResult<FetchOutcome> {
        {
            let mut filter = self.inner.filter.lock();
            filter.page_size = page_size.max(1);
            filter.page = 1;
        }
        self.fetch().await
    }

    /// Switch layout and persist it; never fetches
    pub fn change_view_mode(&self, mode: ViewMode) {
        self.inner.filter.lock().view_mode = mode;
        if let Err(e) = self.inner.prefs.set_view_mode(mode) {
            warn!(error = %e, "could not persist view mode");
        }
    }

    /// Draw a new random seed and fetch the current page again
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn reshuffle(&self) -> ApiResult<FetchOutcome> {
        {
            let mut filter = self.inner.filter.lock();
            self.inner.seeds.lock().reshuffle(&mut filter.random_seed);
            info!(seed = %filter.random_seed, "reshuffled");
        }
        self.fetch().await
    }

    /// Apply changes coming from the state source until it closes
    ///
    /// Fetch failures are already surfaced by [`ListQueryEngine::fetch`] and
    /// do not stop the loop.
    pub async fn follow_source(&self) {
        while let Some(update) = self.inner.source.next_change().await {
            if let Err(e) = self.apply_source_update(update).await {
                debug!(error = %e, "fetch after source change failed");
            }
        }
        debug!("state source closed");
    }

    /// Apply one external change and fetch
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the list call fails.
    pub async fn apply_source_update(&self, update: SourceUpdate) -> ApiResult<FetchOutcome> {
        self.apply(&update.patch, update.page.unwrap_or(1));
        self.fetch().await
    }

    /// Reload the tag vocabulary, leaving the current tag selection alone
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the tag list cannot be fetched.
    pub async fn refresh_vocabulary(&self) -> ApiResult<VocabularyDiff> {
        let tags = self.inner.api.all_tags().await?;
        let diff = self.inner.vocabulary.write().reconcile(tags);
        if !diff.is_empty() {
            debug!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                renamed = diff.renamed.len(),
                "tag vocabulary updated"
            );
        }
        Ok(diff)
    }

    /// Snapshot of the current filter state
    #[must_use]
    pub fn filter(&self) -> FilterState {
        self.inner.filter.lock().clone()
    }

    /// Snapshot of the read model
    #[must_use]
    pub fn read_model(&self) -> ListReadModel {
        self.inner.model.read().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.model.read().loading
    }

    #[must_use]
    pub fn item(&self, id: VideoId) -> Option<VideoSummary> {
        self.inner.model.read().find(id).cloned()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        let page_size = self.inner.filter.lock().page_size;
        self.inner.model.read().total_pages(page_size)
    }

    #[must_use]
    pub fn api(&self) -> &Arc<dyn LibraryApi> {
        &self.inner.api
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    #[must_use]
    pub fn vocabulary(&self) -> &Arc<RwLock<TagVocabulary>> {
        &self.inner.vocabulary
    }

    /// Edit the read model under its write lock
    pub(crate) fn update_model<R>(&self, edit: impl FnOnce(&mut ListReadModel) -> R) -> R {
        edit(&mut self.inner.model.write())
    }

    fn apply(&self, patch: &FilterPatch, page: u32) {
        let mut filter = self.inner.filter.lock();
        let previous = filter.merge(patch);
        filter.page = page.max(1);

        let next = filter.sort;
        if self
            .inner
            .seeds
            .lock()
            .on_sort_change(previous, next, &mut filter.random_seed)
        {
            debug!(seed = %filter.random_seed, "sorting switched to random, new seed drawn");
        }
    }

    /// Pick up a changed shared page size without fetching
    fn sync_page_size(&self) {
        let mut receiver = self.inner.page_size.lock();
        let Some(rx) = receiver.as_mut() else {
            return;
        };
        if rx.has_changed().unwrap_or(false) {
            let page_size = (*rx.borrow_and_update()).max(1);
            debug!(page_size, "shared page size changed");
            self.inner.filter.lock().page_size = page_size;
        }
    }
}

/// Builder for [`ListQueryEngine`]
pub struct ListQueryEngineBuilder {
    api: Option<Arc<dyn LibraryApi>>,
    source: Option<Arc<dyn StateSource>>,
    prefs: Option<Arc<dyn PreferenceStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    vocabulary: Option<Arc<RwLock<TagVocabulary>>>,
    seeds: Option<SeedController>,
    settings: Option<SharedSettings>,
    page_size: Option<u32>,
}

impl ListQueryEngineBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            api: None,
            source: None,
            prefs: None,
            notifier: None,
            vocabulary: None,
            seeds: None,
            settings: None,
            page_size: None,
        }
    }

    /// Set the server client (required)
    #[must_use]
    pub fn api(mut self, api: Arc<dyn LibraryApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the filter source (required)
    #[must_use]
    pub fn source(mut self, source: Arc<dyn StateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Preference store; in-memory when unset
    #[must_use]
    pub fn prefs(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
        self.prefs = Some(prefs);
        self
    }

    /// Notice sink; a silent [`ToastQueue`] when unset
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Share a vocabulary with other components
    #[must_use]
    pub fn vocabulary(mut self, vocabulary: Arc<RwLock<TagVocabulary>>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Seed generator; OS-seeded when unset
    #[must_use]
    pub fn seeds(mut self, seeds: SeedController) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Follow the shared page-size preference
    #[must_use]
    pub fn settings(mut self, settings: &SharedSettings) -> Self {
        self.settings = Some(settings.clone());
        self
    }

    /// Fixed page size, overridden by [`ListQueryEngineBuilder::settings`]
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// Returns `EngineError::BuildError` if the API client or the state
    /// source is missing.
    pub fn build(self) -> Result<ListQueryEngine, EngineError> {
        let api = self
            .api
            .ok_or_else(|| EngineError::BuildError("API client is required".to_string()))?;
        let source = self
            .source
            .ok_or_else(|| EngineError::BuildError("State source is required".to_string()))?;

        let (page_size, receiver) = match &self.settings {
            Some(settings) => {
                let mut rx = settings.subscribe_page_size();
                let current = *rx.borrow_and_update();
                (current, Some(rx))
            }
            None => (self.page_size.unwrap_or(crate::query::DEFAULT_PAGE_SIZE), None),
        };

        let filter = FilterState {
            page_size: page_size.max(1),
            ..FilterState::default()
        };

        Ok(ListQueryEngine {
            inner: Arc::new(EngineInner {
                api,
                source,
                prefs: self
                    .prefs
                    .unwrap_or_else(|| Arc::new(MemoryPreferences::default())),
                notifier: self
                    .notifier
                    .unwrap_or_else(|| Arc::new(ToastQueue::new())),
                vocabulary: self.vocabulary.unwrap_or_default(),
                filter: Mutex::new(filter),
                seeds: Mutex::new(self.seeds.unwrap_or_default()),
                model: RwLock::new(ListReadModel::default()),
                page_size: Mutex::new(receiver),
                issued: AtomicU64::new(0),
            }),
        })
    }
}

impl Default for ListQueryEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
