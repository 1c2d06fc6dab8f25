//! Command implementations
//!
//! Each command is an async function that takes the shared [`Context`] and
//! parsed CLI args and drives the list engine.

pub mod list;
pub mod tags;
pub mod video;
pub mod view;

// Re-export execute functions for convenience
pub use list::execute as list;
pub use tags::execute as tags;
pub use view::execute as view;

use std::sync::Arc;

use tracing::debug;

use crate::VidshelfError;
use crate::api::{LibraryApi, MockLibraryApi};
use crate::config::VidshelfConfig;
use crate::engine::ListQueryEngine;
use crate::models::{Tag, VideoSummary};
use crate::mutate::OptimisticMutator;
use crate::prefs::PreferenceStore;
use crate::query::{MemoryRouter, QueryParams, RouteBackedSource, Router};
use crate::settings::SharedSettings;
use crate::ui::{Confirmer, Notifier, TerminalNotifier};

type Result<T> = std::result::Result<T, VidshelfError>;

/// Everything a command needs: the engine and its collaborators
pub struct Context {
    pub engine: ListQueryEngine,
    pub router: Arc<MemoryRouter>,
    pub prefs: Arc<dyn PreferenceStore>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: SharedSettings,
    pub config: VidshelfConfig,
    pub quiet: bool,
}

impl Context {
    /// Wire an engine to `api`, starting from the share query `query`
    ///
    /// # Errors
    ///
    /// Returns `VidshelfError::EngineError` if the engine cannot be built.
    pub fn new(
        api: Arc<dyn LibraryApi>,
        prefs: Arc<dyn PreferenceStore>,
        config: VidshelfConfig,
        quiet: bool,
        query: Option<&str>,
    ) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier::quiet(quiet));
        let router = Arc::new(MemoryRouter::new(
            query.map(QueryParams::parse).unwrap_or_default(),
        ));

        let mut source = RouteBackedSource::new(router.clone());
        if config.remember_search {
            source = source.remembering(Arc::clone(&prefs));
        }

        let settings = SharedSettings::new(config.page_size);
        let engine = ListQueryEngine::builder()
            .api(api)
            .source(Arc::new(source))
            .prefs(Arc::clone(&prefs))
            .notifier(Arc::clone(&notifier))
            .settings(&settings)
            .build()?;

        Ok(Self {
            engine,
            router,
            prefs,
            notifier,
            settings,
            config,
            quiet,
        })
    }

    /// Mutator over this context's engine
    #[must_use]
    pub fn mutator(&self, confirmer: Arc<dyn Confirmer>) -> OptimisticMutator {
        OptimisticMutator::new(self.engine.clone(), confirmer)
    }

    /// Pick up the page size shared through the server
    ///
    /// The current value (the configured one at first) stays when the server
    /// has no such setting or cannot be reached. Returns the size in effect.
    pub async fn sync_settings(&self) -> u32 {
        match self.engine.api().videos_per_page().await {
            Ok(page_size) => {
                debug!(page_size, "using the server's page size");
                self.settings.set_page_size(page_size);
            }
            Err(e) => debug!(error = %e, "keeping the configured page size"),
        }
        self.settings.page_size()
    }

    /// Load the current page so edits show up in it
    ///
    /// A failed load was already reported by the engine and does not stop
    /// the edit.
    pub async fn load_page(&self) {
        self.sync_settings().await;
        if let Err(e) = self.engine.mount().await {
            debug!(error = %e, "continuing without a loaded page");
        }
    }

    /// Query string describing the current list
    #[must_use]
    pub fn share_query(&self) -> String {
        self.router.current().to_string()
    }
}

/// Small in-memory library for `--demo`
#[must_use]
pub fn demo_library() -> MockLibraryApi {
    const NAMES: [&str; 14] = [
        "alps-timelapse.mp4",
        "birthday-2023.mp4",
        "cat-vs-laser.mp4",
        "city-night-drive.mkv",
        "concert-encore.mp4",
        "dog-beach-day.mp4",
        "garden-rain.mp4",
        "holiday-lisbon.mp4",
        "kitchen-pasta.mp4",
        "lecture-rust-ownership.mkv",
        "morning-run.mp4",
        "northern-lights.mp4",
        "skate-park.mp4",
        "snow-day.mp4",
    ];
    const TAGS: [&str; 4] = ["pets", "travel", "family", "nature"];

    let videos = NAMES
        .iter()
        .zip(1_u64..)
        .map(|(name, id)| {
            let mut video = VideoSummary::new(id, *name);
            video.size = (40 + id * 37 % 400) * 1024 * 1024;
            #[allow(clippy::cast_precision_loss)]
            {
                video.duration = ((id * 97) % 1500 + 45) as f64;
            }
            video.is_favorite = id % 4 == 0;
            video.web_playable = !name.ends_with(".mkv");
            video.tags = match id % 4 {
                0 => vec![TAGS[0].to_string()],
                1 => vec![TAGS[1].to_string(), TAGS[3].to_string()],
                2 => vec![TAGS[2].to_string()],
                _ => Vec::new(),
            };
            video
        })
        .collect();

    let tags = TAGS
        .iter()
        .zip(1_u32..)
        .map(|(name, id)| Tag::new(id, *name))
        .collect();

    MockLibraryApi::new(videos).with_tags(tags)
}
