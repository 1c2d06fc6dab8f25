//! In-memory library server
//!
//! Behaves like the real server for listing (filters, sorting, seeded random
//! order, paging) and mutations, records every call, and can be told to fail
//! or to answer list calls late.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ApiError, ApiResult, LibraryApi, ListPage, ListRequest};
use crate::models::{ProgressSnapshot, ProgressUpdate, Tag, TagId, VideoId, VideoSummary};
use crate::query::{DurationBucket, SortMode};

/// Videos at or under this length count as short
const SHORT_VIDEO_SECS: f64 = 5.0 * 60.0;

const SCRAMBLE_MULTIPLIER: u128 = 2_654_435_761;
const SCRAMBLE_ADDEND: u128 = 1_103_515_245;
const SCRAMBLE_MODULUS: u128 = 2_147_483_647;

/// Operation selector used to script failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    List,
    Delete,
    Rename,
    SetTags,
    Favorite,
    WebPlayable,
    GetProgress,
    PutProgress,
    UploadCover,
    AllTags,
    CreateTag,
    VideosPerPage,
}

/// Record of one call made against the mock
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List(ListRequest),
    Delete(VideoId),
    Rename(VideoId, String),
    SetTags(VideoId, Vec<TagId>),
    Favorite(VideoId, bool),
    WebPlayable(VideoId, bool),
    GetProgress(VideoId),
    PutProgress(VideoId, ProgressUpdate),
    /// Video id and JPEG size in bytes
    UploadCover(VideoId, usize),
    AllTags,
    CreateTag(String),
    VideosPerPage,
}

impl ApiCall {
    #[must_use]
    pub const fn op(&self) -> MockOp {
        match self {
            Self::List(_) => MockOp::List,
            Self::Delete(_) => MockOp::Delete,
            Self::Rename(..) => MockOp::Rename,
            Self::SetTags(..) => MockOp::SetTags,
            Self::Favorite(..) => MockOp::Favorite,
            Self::WebPlayable(..) => MockOp::WebPlayable,
            Self::GetProgress(_) => MockOp::GetProgress,
            Self::PutProgress(..) => MockOp::PutProgress,
            Self::UploadCover(..) => MockOp::UploadCover,
            Self::AllTags => MockOp::AllTags,
            Self::CreateTag(_) => MockOp::CreateTag,
            Self::VideosPerPage => MockOp::VideosPerPage,
        }
    }
}

#[derive(Default)]
struct MockState {
    videos: Vec<VideoSummary>,
    tags: Vec<Tag>,
    progress: HashMap<VideoId, ProgressSnapshot>,
    calls: Vec<ApiCall>,
    failures: HashMap<MockOp, ApiError>,
    list_delays: VecDeque<Duration>,
    videos_per_page: Option<u32>,
}

impl MockState {
    fn record(&mut self, call: ApiCall) -> ApiResult<()> {
        let op = call.op();
        self.calls.push(call);
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn video_mut(&mut self, id: VideoId) -> ApiResult<&mut VideoSummary> {
        self.videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                detail: Some(format!("Video {id} not found")),
            })
    }

    fn tag_names(&self, ids: &[TagId]) -> ApiResult<Vec<String>> {
        ids.iter()
            .map(|id| {
                self.tags
                    .iter()
                    .find(|t| t.id == *id)
                    .map(|t| t.name.clone())
                    .ok_or_else(|| ApiError::Status {
                        status: 400,
                        detail: Some(format!("Unknown tag id {id}")),
                    })
            })
            .collect()
    }
}

/// Scriptable in-memory [`LibraryApi`]
#[derive(Default)]
pub struct MockLibraryApi {
    state: Mutex<MockState>,
}

impl MockLibraryApi {
    #[must_use]
    pub fn new(videos: Vec<VideoSummary>) -> Self {
        Self {
            state: Mutex::new(MockState {
                videos,
                ..MockState::default()
            }),
        }
    }

    /// Seed the tag vocabulary
    #[must_use]
    pub fn with_tags(self, tags: Vec<Tag>) -> Self {
        self.state.lock().tags = tags;
        self
    }

    /// Seed stored progress for one video
    #[must_use]
    pub fn with_progress(self, id: VideoId, snapshot: ProgressSnapshot) -> Self {
        self.state.lock().progress.insert(id, snapshot);
        self
    }

    /// Store a shared page size, as the server's settings page would
    #[must_use]
    pub fn with_videos_per_page(self, videos_per_page: u32) -> Self {
        self.set_videos_per_page(videos_per_page);
        self
    }

    /// Change the shared page size, as another client would
    pub fn set_videos_per_page(&self, videos_per_page: u32) {
        self.state.lock().videos_per_page = Some(videos_per_page);
    }

    /// Make every call of `op` fail with `err` until [`MockLibraryApi::recover`]
    pub fn fail(&self, op: MockOp, err: ApiError) {
        self.state.lock().failures.insert(op, err);
    }

    pub fn recover(&self, op: MockOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Delay the next list call; queued delays apply in call order
    pub fn delay_next_list(&self, delay: Duration) {
        self.state.lock().list_delays.push_back(delay);
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls of `op` received so far
    #[must_use]
    pub fn count(&self, op: MockOp) -> usize {
        self.state.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Server-side copy of the library
    #[must_use]
    pub fn videos(&self) -> Vec<VideoSummary> {
        self.state.lock().videos.clone()
    }

    #[must_use]
    pub fn tags(&self) -> Vec<Tag> {
        self.state.lock().tags.clone()
    }

    /// Add a tag to the vocabulary directly, as another client would
    pub fn insert_tag(&self, name: &str) -> Tag {
        let mut state = self.state.lock();
        let tag = Tag::new(next_tag_id(&state.tags), name);
        state.tags.push(tag.clone());
        tag
    }

    fn page(state: &MockState, request: &ListRequest) -> ListPage {
        let wanted_tags = request.tag_ids();
        let wanted_names: Vec<String> = state
            .tags
            .iter()
            .filter(|t| wanted_tags.contains(&t.id))
            .map(|t| t.name.clone())
            .collect();
        let keyword = request.keyword.as_deref().map(str::to_lowercase);

        let mut matches: Vec<&VideoSummary> = state
            .videos
            .iter()
            .filter(|v| {
                keyword
                    .as_deref()
                    .is_none_or(|k| v.filename.to_lowercase().contains(k))
            })
            .filter(|v| request.favorite.is_none_or(|f| v.is_favorite == f))
            .filter(|v| {
                wanted_names.len() == wanted_tags.len()
                    && wanted_names.iter().all(|name| v.tags.contains(name))
            })
            .filter(|v| match request.duration {
                Some(DurationBucket::Short) => v.duration <= SHORT_VIDEO_SECS,
                Some(DurationBucket::Long) => v.duration > SHORT_VIDEO_SECS,
                None => true,
            })
            .collect();

        match request.sort_by {
            SortMode::Filename => matches.sort_by(|a, b| a.filename.cmp(&b.filename)),
            SortMode::Duration => matches.sort_by(|a, b| b.duration.total_cmp(&a.duration)),
            SortMode::Size => matches.sort_by(|a, b| b.size.cmp(&a.size)),
            SortMode::CreatedAt => matches.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortMode::Random => {
                let seed = u128::from(request.seed.unwrap_or_default());
                matches.sort_by_key(|v| scramble(v.id, seed));
            }
        }

        let total = matches.len() as u64;
        let skip = usize::try_from(request.skip).unwrap_or(usize::MAX);
        let items = matches
            .into_iter()
            .skip(skip)
            .take(request.limit as usize)
            .cloned()
            .collect();

        ListPage { items, total }
    }
}

/// Deterministic per-seed ordering key
fn scramble(id: VideoId, seed: u128) -> u128 {
    let offset = (seed * SCRAMBLE_ADDEND) % SCRAMBLE_MODULUS;
    (u128::from(id) * SCRAMBLE_MULTIPLIER + offset) % SCRAMBLE_MODULUS
}

fn next_tag_id(tags: &[Tag]) -> TagId {
    tags.iter().map(|t| t.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl LibraryApi for MockLibraryApi {
    async fn list(&self, request: &ListRequest) -> ApiResult<ListPage> {
        let delay = {
            let mut state = self.state.lock();
            state.record(ApiCall::List(request.clone()))?;
            state.list_delays.pop_front()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock();
        Ok(Self::page(&state, request))
    }

    async fn delete_video(&self, id: VideoId) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::Delete(id))?;
        state.video_mut(id)?;
        state.videos.retain(|v| v.id != id);
        state.progress.remove(&id);
        Ok(())
    }

    async fn rename_video(&self, id: VideoId, new_name: &str) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::Rename(id, new_name.to_string()))?;
        if new_name.trim().is_empty() {
            return Err(ApiError::Status {
                status: 400,
                detail: Some("New name must not be empty".to_string()),
            });
        }
        if state.videos.iter().any(|v| v.id != id && v.filename == new_name) {
            return Err(ApiError::Status {
                status: 400,
                detail: Some(format!("A video named '{new_name}' already exists")),
            });
        }
        state.video_mut(id)?.filename = new_name.to_string();
        Ok(())
    }

    async fn set_video_tags(&self, id: VideoId, tag_ids: &[TagId]) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::SetTags(id, tag_ids.to_vec()))?;
        let names = state.tag_names(tag_ids)?;
        state.video_mut(id)?.tags = names;
        Ok(())
    }

    async fn set_favorite(&self, id: VideoId, is_favorite: bool) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::Favorite(id, is_favorite))?;
        state.video_mut(id)?.is_favorite = is_favorite;
        Ok(())
    }

    async fn set_web_playable(&self, id: VideoId, web_playable: bool) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::WebPlayable(id, web_playable))?;
        state.video_mut(id)?.web_playable = web_playable;
        Ok(())
    }

    async fn get_progress(&self, id: VideoId) -> ApiResult<Option<ProgressSnapshot>> {
        let mut state = self.state.lock();
        state.record(ApiCall::GetProgress(id))?;
        Ok(state.progress.get(&id).cloned())
    }

    async fn put_progress(&self, id: VideoId, update: &ProgressUpdate) -> ApiResult<()> {
        let mut state = self.state.lock();
        state.record(ApiCall::PutProgress(id, update.clone()))?;
        state.video_mut(id)?;

        let watch_progress = if update.duration > 0.0 {
            (update.position / update.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        state.progress.insert(
            id,
            ProgressSnapshot {
                last_position: update.position,
                watch_progress,
                is_completed: watch_progress >= 0.95,
                last_watched_at: Some(chrono::Utc::now()),
            },
        );
        Ok(())
    }

    async fn upload_cover(&self, id: VideoId, jpeg: Vec<u8>) -> ApiResult<String> {
        let mut state = self.state.lock();
        state.record(ApiCall::UploadCover(id, jpeg.len()))?;
        let video = state.video_mut(id)?;
        let path = format!("covers/{}.jpg", video.filename);
        video.cover = Some(path.clone());
        Ok(path)
    }

    async fn all_tags(&self) -> ApiResult<Vec<Tag>> {
        let mut state = self.state.lock();
        state.record(ApiCall::AllTags)?;
        Ok(state.tags.clone())
    }

    async fn create_tag(&self, name: &str) -> ApiResult<Tag> {
        let mut state = self.state.lock();
        state.record(ApiCall::CreateTag(name.to_string()))?;
        if let Some(existing) = state.tags.iter().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let tag = Tag::new(next_tag_id(&state.tags), name);
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn videos_per_page(&self) -> ApiResult<u32> {
        let mut state = self.state.lock();
        state.record(ApiCall::VideosPerPage)?;
        state.videos_per_page.ok_or_else(|| ApiError::Status {
            status: 404,
            detail: Some("Setting videos_per_page not found".to_string()),
        })
    }

    fn stream_url(&self, id: VideoId) -> String {
        format!("memory://videos/{id}/stream")
    }
}
