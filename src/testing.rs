//! Testing utilities for vidshelf
//!
//! Provides `TempPrefs`, a sled preference store living in a temporary
//! directory, plus small fixtures shared by unit tests.
//!
//! Only available when compiled with `cfg(test)`.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::models::VideoSummary;
use crate::prefs::SledPreferences;

/// Temporary sled preference store that is removed on drop
pub struct TempPrefs {
    dir: TempDir,
    prefs: SledPreferences,
}

impl TempPrefs {
    /// Open a fresh store in a new temporary directory
    ///
    /// # Panics
    /// Panics if the directory or the database cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let prefs = SledPreferences::open(Self::db_path(&dir)).expect("Failed to open prefs");
        Self { dir, prefs }
    }

    #[must_use]
    pub const fn prefs(&self) -> &SledPreferences {
        &self.prefs
    }

    /// Close the store and open it again from disk
    ///
    /// # Panics
    /// Panics if the database cannot be reopened.
    #[must_use]
    pub fn reopen(self) -> Self {
        let Self { dir, prefs } = self;
        drop(prefs);
        let prefs = SledPreferences::open(Self::db_path(&dir)).expect("Failed to reopen prefs");
        Self { dir, prefs }
    }

    fn db_path(dir: &TempDir) -> PathBuf {
        dir.path().join("prefs")
    }
}

impl Default for TempPrefs {
    fn default() -> Self {
        Self::new()
    }
}

/// A page worth of numbered videos: `video-01.mp4`, `video-02.mp4`, ...
#[must_use]
pub fn sample_videos(count: u64) -> Vec<VideoSummary> {
    (1..=count)
        .map(|id| {
            let mut video = VideoSummary::new(id, format!("video-{id:02}.mp4"));
            video.size = id * 1024 * 1024;
            #[allow(clippy::cast_precision_loss)]
            {
                video.duration = (id * 60) as f64;
            }
            video
        })
        .collect()
}
