//! Where a list engine gets its filters from
//!
//! A route-driven engine reads and mirrors the route query string, and may
//! remember the last search in the preference store. An embedded engine is
//! handed its filters by the surrounding view and never touches the route.
//! The engine only sees the [`StateSource`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::codec;
use super::params::QueryParams;
use super::state::{FilterPatch, FilterState};
use crate::prefs::{PreferenceStore, SavedSearch};

/// Filter change coming from outside the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUpdate {
    pub patch: FilterPatch,
    /// Page to land on; `None` means back to the first page
    pub page: Option<u32>,
}

/// Strategy supplying initial filters and later external changes
#[async_trait]
pub trait StateSource: Send + Sync {
    /// Initial filter fields, layered over `base`
    fn load(&self, base: &FilterState) -> FilterState;

    /// Reflect the engine's state back to the source
    fn mirror(&self, state: &FilterState);

    /// Wait for the next change not caused by [`StateSource::mirror`]
    ///
    /// Returns `None` once the source is gone.
    async fn next_change(&self) -> Option<SourceUpdate>;
}

/// Access to the current route's query string
pub trait Router: Send + Sync {
    fn current(&self) -> QueryParams;

    /// Replace the query string without adding a history entry
    fn replace(&self, params: QueryParams);

    fn subscribe(&self) -> watch::Receiver<QueryParams>;
}

/// Router holding the query string in memory
#[derive(Debug)]
pub struct MemoryRouter {
    tx: watch::Sender<QueryParams>,
}

impl MemoryRouter {
    #[must_use]
    pub fn new(initial: QueryParams) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Simulate the user navigating to `query`
    pub fn navigate(&self, query: &str) {
        self.tx.send_replace(QueryParams::parse(query));
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new(QueryParams::new())
    }
}

impl Router for MemoryRouter {
    fn current(&self) -> QueryParams {
        self.tx.borrow().clone()
    }

    fn replace(&self, params: QueryParams) {
        self.tx.send_replace(params);
    }

    fn subscribe(&self) -> watch::Receiver<QueryParams> {
        self.tx.subscribe()
    }
}

/// Source backed by the route query string
pub struct RouteBackedSource {
    router: Arc<dyn Router>,
    prefs: Option<Arc<dyn PreferenceStore>>,
    changes: tokio::sync::Mutex<watch::Receiver<QueryParams>>,
    last_mirrored: Mutex<Option<FilterState>>,
}

impl RouteBackedSource {
    #[must_use]
    pub fn new(router: Arc<dyn Router>) -> Self {
        let changes = tokio::sync::Mutex::new(router.subscribe());
        Self {
            router,
            prefs: None,
            changes,
            last_mirrored: Mutex::new(None),
        }
    }

    /// Also save each mirrored search and restore it when the route is bare
    #[must_use]
    pub fn remembering(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
        self.prefs = Some(prefs);
        self
    }

    fn saved_params(&self) -> Option<QueryParams> {
        let prefs = self.prefs.as_ref()?;
        match prefs.saved_search() {
            Ok(saved) => saved.map(|s| QueryParams::parse(&s.query)),
            Err(e) => {
                warn!(error = %e, "could not read saved search");
                None
            }
        }
    }
}

#[async_trait]
impl StateSource for RouteBackedSource {
    fn load(&self, base: &FilterState) -> FilterState {
        let current = self.router.current();
        if codec::carries_filters(&current) {
            return codec::decode(&current, base);
        }

        match self.saved_params() {
            Some(saved) => {
                debug!(query = %saved, "restoring saved search");
                codec::decode(&saved, base)
            }
            None => codec::decode(&current, base),
        }
    }

    fn mirror(&self, state: &FilterState) {
        let current = self.router.current();
        let merged = codec::merge_into(&current, state);
        *self.last_mirrored.lock() = Some(state.clone());

        if merged != current {
            self.router.replace(merged);
        }

        if let Some(prefs) = &self.prefs {
            let saved = SavedSearch {
                query: codec::encode(state).to_string(),
                saved_at: Utc::now().timestamp_millis(),
            };
            if let Err(e) = prefs.save_search(&saved) {
                warn!(error = %e, "could not save search state");
            }
        }
    }

    async fn next_change(&self) -> Option<SourceUpdate> {
        let mut changes = self.changes.lock().await;
        loop {
            changes.changed().await.ok()?;
            let params = changes.borrow_and_update().clone();
            let decoded = codec::decode(&params, &FilterState::default());

            let echoed = self
                .last_mirrored
                .lock()
                .as_ref()
                .is_some_and(|mirrored| mirrored.same_query(&decoded));
            if echoed {
                continue;
            }

            debug!(query = %params, "route changed");
            return Some(SourceUpdate {
                patch: FilterPatch::from_state(&decoded),
                page: Some(decoded.page),
            });
        }
    }
}

/// Source fed by the embedding view
///
/// The page always restarts at 1 when the supplied filters change, and
/// nothing is mirrored back.
pub struct ExternallySuppliedSource {
    latest: watch::Receiver<FilterPatch>,
    changes: tokio::sync::Mutex<watch::Receiver<FilterPatch>>,
}

impl ExternallySuppliedSource {
    #[must_use]
    pub fn new(filters: watch::Receiver<FilterPatch>) -> Self {
        let changes = tokio::sync::Mutex::new(filters.clone());
        Self {
            latest: filters,
            changes,
        }
    }

    /// Create the source together with the sender the embedding view keeps
    #[must_use]
    pub fn channel(initial: FilterPatch) -> (watch::Sender<FilterPatch>, Self) {
        let (tx, rx) = watch::channel(initial);
        (tx, Self::new(rx))
    }
}

/// Supplied filters over the defaults
///
/// Each supplied object is complete: a field it leaves out goes back to its
/// default rather than keeping the previous value.
fn resolve_supplied(supplied: &FilterPatch) -> FilterState {
    let mut state = FilterState::default();
    state.merge(supplied);
    state
}

#[async_trait]
impl StateSource for ExternallySuppliedSource {
    fn load(&self, base: &FilterState) -> FilterState {
        let mut state = resolve_supplied(&self.latest.borrow());
        state.page_size = base.page_size;
        state.view_mode = base.view_mode;
        state.random_seed = base.random_seed;
        state
    }

    fn mirror(&self, _state: &FilterState) {}

    async fn next_change(&self) -> Option<SourceUpdate> {
        let mut changes = self.changes.lock().await;
        changes.changed().await.ok()?;
        let state = resolve_supplied(&changes.borrow_and_update());
        debug!(query = ?state, "supplied filters changed");
        Some(SourceUpdate {
            patch: FilterPatch::from_state(&state),
            page: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferences;
    use crate::query::state::SortMode;
    use std::collections::BTreeSet;

    #[test]
    fn test_route_wins_over_saved_search() {
        let prefs = Arc::new(MemoryPreferences::default());
        prefs
            .save_search(&SavedSearch {
                query: "sort=size&page=4".into(),
                saved_at: 0,
            })
            .unwrap();

        let router = Arc::new(MemoryRouter::new(QueryParams::parse("sort=filename")));
        let source = RouteBackedSource::new(router).remembering(prefs);
        let state = source.load(&FilterState::default());

        assert_eq!(state.sort, SortMode::Filename);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_saved_search_used_when_route_is_bare() {
        let prefs = Arc::new(MemoryPreferences::default());
        prefs
            .save_search(&SavedSearch {
                query: "sort=size&page=4".into(),
                saved_at: 0,
            })
            .unwrap();

        let router = Arc::new(MemoryRouter::new(QueryParams::parse("lang=de")));
        let source = RouteBackedSource::new(router).remembering(prefs);
        let state = source.load(&FilterState::default());

        assert_eq!(state.sort, SortMode::Size);
        assert_eq!(state.page, 4);
    }

    #[test]
    fn test_mirror_merges_and_saves() {
        let prefs = Arc::new(MemoryPreferences::default());
        let router = Arc::new(MemoryRouter::new(QueryParams::parse("lang=de&page=3")));
        let source = RouteBackedSource::new(router.clone()).remembering(prefs.clone());

        let state = FilterState {
            keyword: "dogs".into(),
            ..FilterState::default()
        };
        source.mirror(&state);

        assert_eq!(router.current().to_string(), "lang=de&search=dogs&sort=random");
        let saved = prefs.saved_search().unwrap().unwrap();
        assert_eq!(saved.query, "search=dogs&sort=random");
    }

    #[tokio::test]
    async fn test_next_change_skips_own_mirror() {
        let router = Arc::new(MemoryRouter::default());
        let source = RouteBackedSource::new(router.clone());

        source.mirror(&FilterState {
            page: 2,
            ..FilterState::default()
        });
        router.navigate("tags=4&sort=duration&page=3");

        let update = source.next_change().await.unwrap();
        assert_eq!(update.page, Some(3));
        assert_eq!(update.patch.sort, Some(SortMode::Duration));
        assert_eq!(update.patch.tag_ids, Some(BTreeSet::from([4])));
    }

    #[tokio::test]
    async fn test_external_source_reports_patches() {
        let (tx, source) =
            ExternallySuppliedSource::channel(FilterPatch::default().keyword("initial"));

        let state = source.load(&FilterState {
            page_size: 12,
            ..FilterState::default()
        });
        assert_eq!(state.keyword, "initial");
        assert_eq!(state.page_size, 12);

        tx.send_replace(FilterPatch::default().only_favorites(true));
        let update = source.next_change().await.unwrap();
        assert_eq!(update.patch.only_favorites, Some(true));
        assert_eq!(update.patch.keyword.as_deref(), Some(""));
        assert_eq!(update.page, None);

        drop(tx);
        assert!(source.next_change().await.is_none());
    }
}
