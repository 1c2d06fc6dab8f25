//! Typed contract of the video library server
//!
//! [`LibraryApi`] is the seam every component talks through.
//! [`HttpLibraryApi`] speaks the real HTTP API; [`MockLibraryApi`] is an
//! in-memory library used by tests and the `--demo` mode of the CLI.

pub mod error;
pub mod http;
pub mod mock;

pub use error::ApiError;
pub use http::HttpLibraryApi;
pub use mock::{ApiCall, MockLibraryApi, MockOp};

use async_trait::async_trait;

use crate::models::{ProgressSnapshot, ProgressUpdate, Tag, TagId, VideoId, VideoSummary};
use crate::query::{DurationBucket, FilterState, SortMode};

/// Result alias for server calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Parameters of one list call
///
/// Optional fields are left out of the request when unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub skip: u64,
    pub limit: u32,
    pub keyword: Option<String>,
    pub favorite: Option<bool>,
    /// Comma-joined tag ids
    pub tags: Option<String>,
    pub duration: Option<DurationBucket>,
    pub sort_by: SortMode,
    /// Integer seed, only present for random ordering
    pub seed: Option<u32>,
}

impl ListRequest {
    /// Build the request for the page `state` points at
    #[must_use]
    pub fn from_state(state: &FilterState) -> Self {
        let keyword = state.keyword.trim();
        Self {
            skip: state.skip(),
            limit: state.page_size,
            keyword: (!keyword.is_empty()).then(|| keyword.to_string()),
            favorite: state.only_favorites.then_some(true),
            tags: (!state.tag_ids.is_empty()).then(|| {
                state
                    .tag_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            }),
            duration: state.duration,
            sort_by: state.sort,
            seed: state
                .sort
                .is_random()
                .then(|| state.random_seed.to_server()),
        }
    }

    /// Query-string pairs in wire order
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("skip", self.skip.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        if let Some(favorite) = self.favorite {
            pairs.push(("favorite", favorite.to_string()));
        }
        if let Some(tags) = &self.tags {
            pairs.push(("tags", tags.clone()));
        }
        if let Some(duration) = self.duration {
            pairs.push(("duration", duration.as_str().to_string()));
        }
        pairs.push(("sort_by", self.sort_by.as_str().to_string()));
        if let Some(seed) = self.seed {
            pairs.push(("seed", seed.to_string()));
        }
        pairs
    }

    /// Tag ids carried by the request
    #[must_use]
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags
            .as_deref()
            .map(|joined| joined.split(',').filter_map(|t| t.parse().ok()).collect())
            .unwrap_or_default()
    }
}

/// One page of list results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListPage {
    pub items: Vec<VideoSummary>,
    /// Number of matches across all pages
    pub total: u64,
}

/// Operations offered by the library server
#[async_trait]
pub trait LibraryApi: Send + Sync {
    async fn list(&self, request: &ListRequest) -> ApiResult<ListPage>;

    async fn delete_video(&self, id: VideoId) -> ApiResult<()>;

    async fn rename_video(&self, id: VideoId, new_name: &str) -> ApiResult<()>;

    /// Replace the whole tag set of a video
    async fn set_video_tags(&self, id: VideoId, tag_ids: &[TagId]) -> ApiResult<()>;

    async fn set_favorite(&self, id: VideoId, is_favorite: bool) -> ApiResult<()>;

    /// Mark whether the video plays in a browser without transcoding
    async fn set_web_playable(&self, id: VideoId, web_playable: bool) -> ApiResult<()>;

    /// Latest progress, `None` when the video was never played
    async fn get_progress(&self, id: VideoId) -> ApiResult<Option<ProgressSnapshot>>;

    async fn put_progress(&self, id: VideoId, update: &ProgressUpdate) -> ApiResult<()>;

    /// Store a JPEG as the video's cover and return its path
    async fn upload_cover(&self, id: VideoId, jpeg: Vec<u8>) -> ApiResult<String>;

    async fn all_tags(&self) -> ApiResult<Vec<Tag>>;

    async fn create_tag(&self, name: &str) -> ApiResult<Tag>;

    /// Page size shared by every client of the server
    async fn videos_per_page(&self) -> ApiResult<u32>;

    /// URL a player can stream the video from
    fn stream_url(&self, id: VideoId) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::RandomSeed;
    use std::collections::BTreeSet;

    #[test]
    fn test_defaults_are_not_transmitted() {
        let state = FilterState {
            sort: SortMode::Filename,
            ..FilterState::default()
        };
        let request = ListRequest::from_state(&state);
        let keys: Vec<&str> = request.query_pairs().iter().map(|(k, _)| *k).collect();

        assert_eq!(keys, vec!["skip", "limit", "sort_by"]);
    }

    #[test]
    fn test_seed_only_in_random_mode() {
        let state = FilterState {
            random_seed: RandomSeed::new(0.4242),
            page: 3,
            page_size: 10,
            ..FilterState::default()
        };
        let request = ListRequest::from_state(&state);
        assert_eq!(request.seed, Some(424_200));
        assert_eq!(request.skip, 20);
        assert_eq!(request.limit, 10);

        let sorted = FilterState {
            sort: SortMode::Size,
            ..state
        };
        assert_eq!(ListRequest::from_state(&sorted).seed, None);
    }

    #[test]
    fn test_filters_are_transmitted() {
        let state = FilterState {
            keyword: "  beach ".into(),
            only_favorites: true,
            tag_ids: BTreeSet::from([4, 2]),
            duration: Some(DurationBucket::Short),
            ..FilterState::default()
        };
        let request = ListRequest::from_state(&state);

        assert_eq!(request.keyword.as_deref(), Some("beach"));
        assert_eq!(request.favorite, Some(true));
        assert_eq!(request.tags.as_deref(), Some("2,4"));
        assert_eq!(request.tag_ids(), vec![2, 4]);
        assert_eq!(request.duration, Some(DurationBucket::Short));
    }
}
