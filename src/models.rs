//! Domain types shared by the list engine and its collaborators
//!
//! These are plain data structures. The read model owns `VideoSummary`
//! values and every mutation goes through [`VideoSummary::apply_patch`],
//! which edits fields in place and hands back the inverse patch so a failed
//! remote call can be rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side identity of a video
pub type VideoId = u64;

/// Server-side identity of a tag
pub type TagId = u32;

/// One entry of the current result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: VideoId,
    pub filename: String,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
    /// Tag names, in display order
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default = "default_web_playable")]
    pub web_playable: bool,
    /// Cover image reference, possibly carrying a cache-busting marker
    #[serde(default)]
    pub cover: Option<String>,
    /// Last playback position in seconds
    #[serde(default)]
    pub last_position: f64,
    /// Fraction watched, `0.0..=1.0`
    #[serde(default)]
    pub watch_progress: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

const fn default_web_playable() -> bool {
    true
}

impl VideoSummary {
    /// Create a summary with only identity and filename set
    #[must_use]
    pub fn new(id: VideoId, filename: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            size: 0,
            duration: 0.0,
            tags: Vec::new(),
            is_favorite: false,
            web_playable: true,
            cover: None,
            last_position: 0.0,
            watch_progress: 0.0,
            is_completed: false,
            last_watched_at: None,
            created_at: None,
        }
    }

    /// Merge `patch` into this item and return the patch that undoes it
    ///
    /// Only fields present in `patch` are touched; the returned inverse
    /// carries the previous value of exactly those fields.
    pub fn apply_patch(&mut self, patch: &VideoPatch) -> VideoPatch {
        let mut inverse = VideoPatch::default();

        if let Some(filename) = &patch.filename {
            inverse.filename = Some(std::mem::replace(&mut self.filename, filename.clone()));
        }
        if let Some(tags) = &patch.tags {
            inverse.tags = Some(std::mem::replace(&mut self.tags, tags.clone()));
        }
        if let Some(is_favorite) = patch.is_favorite {
            inverse.is_favorite = Some(std::mem::replace(&mut self.is_favorite, is_favorite));
        }
        if let Some(web_playable) = patch.web_playable {
            inverse.web_playable = Some(std::mem::replace(&mut self.web_playable, web_playable));
        }
        if let Some(cover) = &patch.cover {
            inverse.cover = Some(std::mem::replace(&mut self.cover, cover.clone()));
        }
        if let Some(last_position) = patch.last_position {
            inverse.last_position = Some(std::mem::replace(&mut self.last_position, last_position));
        }
        if let Some(watch_progress) = patch.watch_progress {
            inverse.watch_progress =
                Some(std::mem::replace(&mut self.watch_progress, watch_progress.clamp(0.0, 1.0)));
        }
        if let Some(is_completed) = patch.is_completed {
            inverse.is_completed = Some(std::mem::replace(&mut self.is_completed, is_completed));
        }
        if let Some(last_watched_at) = patch.last_watched_at {
            inverse.last_watched_at =
                Some(std::mem::replace(&mut self.last_watched_at, last_watched_at));
        }

        inverse
    }
}

/// Partial update of a [`VideoSummary`]
///
/// `None` leaves a field alone. Nullable fields use `Option<Option<_>>` so a
/// patch can clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoPatch {
    pub filename: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub web_playable: Option<bool>,
    pub cover: Option<Option<String>>,
    pub last_position: Option<f64>,
    pub watch_progress: Option<f64>,
    pub is_completed: Option<bool>,
    pub last_watched_at: Option<Option<DateTime<Utc>>>,
}

impl VideoPatch {
    #[must_use]
    pub fn filename(name: impl Into<String>) -> Self {
        Self {
            filename: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn web_playable(web_playable: bool) -> Self {
        Self {
            web_playable: Some(web_playable),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn cover(cover: impl Into<String>) -> Self {
        Self {
            cover: Some(Some(cover.into())),
            ..Self::default()
        }
    }

    /// Patch carrying the four playback-progress fields
    #[must_use]
    pub fn progress(snapshot: &ProgressSnapshot) -> Self {
        Self {
            last_position: Some(snapshot.last_position),
            watch_progress: Some(snapshot.watch_progress),
            is_completed: Some(snapshot.is_completed),
            last_watched_at: Some(snapshot.last_watched_at),
            ..Self::default()
        }
    }

    /// Whether the patch touches no field at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Latest playback progress for one video, as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub last_position: f64,
    pub watch_progress: f64,
    pub is_completed: bool,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// Progress report sent by the player when playback stops
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Current position in seconds
    pub position: f64,
    /// Total duration in seconds
    pub duration: f64,
}

/// Entry of the global tag vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    #[must_use]
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_patch_returns_inverse() {
        let mut video = VideoSummary::new(1, "holiday.mp4");
        video.tags = vec!["beach".into()];

        let patch = VideoPatch {
            filename: Some("summer.mp4".into()),
            is_favorite: Some(true),
            ..VideoPatch::default()
        };
        let inverse = video.apply_patch(&patch);

        assert_eq!(video.filename, "summer.mp4");
        assert!(video.is_favorite);
        assert_eq!(video.tags, vec!["beach".to_string()]);

        assert_eq!(inverse.filename.as_deref(), Some("holiday.mp4"));
        assert_eq!(inverse.is_favorite, Some(false));
        assert!(inverse.tags.is_none());

        video.apply_patch(&inverse);
        assert_eq!(video, {
            let mut original = VideoSummary::new(1, "holiday.mp4");
            original.tags = vec!["beach".into()];
            original
        });
    }

    #[test]
    fn test_progress_patch_clamps_watch_progress() {
        let mut video = VideoSummary::new(7, "talk.mkv");
        let snapshot = ProgressSnapshot {
            last_position: 30.0,
            watch_progress: 1.4,
            is_completed: true,
            last_watched_at: None,
        };

        video.apply_patch(&VideoPatch::progress(&snapshot));

        assert!((video.watch_progress - 1.0).abs() < f64::EPSILON);
        assert!(video.is_completed);
        assert!((video.last_position - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cover_patch_can_be_undone_to_none() {
        let mut video = VideoSummary::new(3, "clip.mp4");
        let inverse = video.apply_patch(&VideoPatch::cover("covers/clip.mp4.jpg?t=1"));

        assert_eq!(video.cover.as_deref(), Some("covers/clip.mp4.jpg?t=1"));
        assert_eq!(inverse.cover, Some(None));

        video.apply_patch(&inverse);
        assert!(video.cover.is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(VideoPatch::default().is_empty());
        assert!(!VideoPatch::favorite(false).is_empty());
    }

    #[test]
    fn test_summary_deserializes_with_missing_fields() {
        let json = r#"{"id": 4, "filename": "a.mp4"}"#;
        let video: VideoSummary = serde_json::from_str(json).unwrap();

        assert_eq!(video.id, 4);
        assert!(video.web_playable);
        assert!(video.tags.is_empty());
        assert!(video.cover.is_none());
    }
}
