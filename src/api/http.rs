//! HTTP implementation of [`LibraryApi`]

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, ApiResult, LibraryApi, ListPage, ListRequest};
use crate::models::{ProgressSnapshot, ProgressUpdate, Tag, TagId, VideoId, VideoSummary};

/// Client for a running library server
pub struct HttpLibraryApi {
    client: Client,
    base_url: String,
}

impl HttpLibraryApi {
    /// Create a client rooted at `base_url`
    ///
    /// A missing scheme defaults to `http://` and a trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Rejected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base_url))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        check_response(response).await
    }
}

fn normalize_base_url(raw: &str) -> ApiResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    Url::parse(&with_scheme)
        .map_err(|e| ApiError::Rejected(format!("invalid server URL '{raw}': {e}")))?;
    Ok(with_scheme)
}

/// Map non-success statuses to `ApiError::Status`, keeping the server's
/// `detail` or `message` text when it sent one
async fn check_response(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_else(|e| {
        warn!("failed to read error body: {e}");
        String::new()
    });
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.detail.or(body.message));

    Err(ApiError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct PageRecord {
    total: u64,
    items: Vec<VideoRecord>,
}

#[derive(Deserialize)]
struct PageSizeRecord {
    videos_per_page: u32,
}

#[derive(Deserialize)]
struct TagRecord {
    id: TagId,
    name: String,
}

impl From<TagRecord> for Tag {
    fn from(record: TagRecord) -> Self {
        Self::new(record.id, record.name)
    }
}

#[derive(Deserialize)]
struct VideoRecord {
    id: VideoId,
    filename: String,
    #[serde(default)]
    size: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    thumbnail_path: Option<String>,
    #[serde(default)]
    is_favorite: bool,
    #[serde(default = "default_true")]
    web_playable: bool,
    #[serde(default)]
    tags: Option<Vec<TagRecord>>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    last_position: f64,
    #[serde(default)]
    watch_progress: f64,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    last_watched_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl From<VideoRecord> for VideoSummary {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(record: VideoRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            size: record.size.max(0.0) as u64,
            duration: record.duration,
            tags: record
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| t.name)
                .collect(),
            is_favorite: record.is_favorite,
            web_playable: record.web_playable,
            cover: record.thumbnail_path,
            last_position: record.last_position,
            watch_progress: record.watch_progress.clamp(0.0, 1.0),
            is_completed: record.is_completed,
            last_watched_at: record.last_watched_at.as_deref().and_then(parse_timestamp),
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Deserialize)]
struct ProgressRecord {
    #[serde(default)]
    last_position: f64,
    #[serde(default)]
    watch_progress: f64,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    last_watched_at: Option<String>,
}

impl From<ProgressRecord> for ProgressSnapshot {
    fn from(record: ProgressRecord) -> Self {
        Self {
            last_position: record.last_position,
            watch_progress: record.watch_progress,
            is_completed: record.is_completed,
            last_watched_at: record.last_watched_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Deserialize)]
struct CoverRecord {
    thumbnail_path: String,
}

/// Accept RFC 3339 and the naive ISO form the server emits, read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn list(&self, request: &ListRequest) -> ApiResult<ListPage> {
        let mut url = Url::parse(&format!("{}/videos/list", self.base_url))
            .map_err(|e| ApiError::Rejected(e.to_string()))?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        debug!(%url, "listing videos");

        let response = self.send(self.client.get(url)).await?;
        let page: PageRecord = response.json().await?;
        Ok(ListPage {
            total: page.total,
            items: page.items.into_iter().map(VideoSummary::from).collect(),
        })
    }

    async fn delete_video(&self, id: VideoId) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &format!("/videos/{id}")))
            .await?;
        Ok(())
    }

    async fn rename_video(&self, id: VideoId, new_name: &str) -> ApiResult<()> {
        let request = self
            .request(Method::PUT, &format!("/videos/{id}"))
            .query(&[("new_name", new_name)]);
        self.send(request).await?;
        Ok(())
    }

    async fn set_video_tags(&self, id: VideoId, tag_ids: &[TagId]) -> ApiResult<()> {
        let request = self
            .request(Method::PUT, &format!("/tags/video/{id}/tags"))
            .json(&serde_json::json!({ "tag_ids": tag_ids }));
        self.send(request).await?;
        Ok(())
    }

    async fn set_favorite(&self, id: VideoId, is_favorite: bool) -> ApiResult<()> {
        let request = self
            .request(Method::POST, &format!("/videos/{id}/favorite"))
            .query(&[("is_favorite", is_favorite)]);
        self.send(request).await?;
        Ok(())
    }

    async fn set_web_playable(&self, id: VideoId, web_playable: bool) -> ApiResult<()> {
        let request = self
            .request(Method::POST, &format!("/videos/{id}/web_playable"))
            .query(&[("web_playable", web_playable)]);
        self.send(request).await?;
        Ok(())
    }

    async fn get_progress(&self, id: VideoId) -> ApiResult<Option<ProgressSnapshot>> {
        let response = self
            .request(Method::GET, &format!("/videos/{id}/progress"))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_response(response).await?;
        let record: Option<ProgressRecord> = response.json().await?;
        Ok(record.map(ProgressSnapshot::from))
    }

    async fn put_progress(&self, id: VideoId, update: &ProgressUpdate) -> ApiResult<()> {
        let request = self
            .request(Method::PUT, &format!("/videos/{id}/progress"))
            .json(update);
        self.send(request).await?;
        Ok(())
    }

    async fn upload_cover(&self, id: VideoId, jpeg: Vec<u8>) -> ApiResult<String> {
        let part = Part::bytes(jpeg)
            .file_name(format!("{id}.jpg"))
            .mime_str("image/jpeg")?;
        let request = self
            .request(Method::PUT, &format!("/videos/{id}/thumbnail"))
            .multipart(Form::new().part("thumbnail", part));

        let response = self.send(request).await?;
        let cover: CoverRecord = response.json().await?;
        Ok(cover.thumbnail_path)
    }

    async fn all_tags(&self) -> ApiResult<Vec<Tag>> {
        let response = self.send(self.request(Method::GET, "/tags/")).await?;
        let tags: Vec<TagRecord> = response.json().await?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    async fn create_tag(&self, name: &str) -> ApiResult<Tag> {
        let request = self
            .request(Method::POST, "/tags/")
            .json(&serde_json::json!({ "name": name }));
        let response = self.send(request).await?;
        let tag: TagRecord = response.json().await?;
        Ok(tag.into())
    }

    async fn videos_per_page(&self) -> ApiResult<u32> {
        let response = self
            .send(self.request(Method::GET, "/settings/videos_per_page"))
            .await?;
        let setting: PageSizeRecord = response.json().await?;
        Ok(setting.videos_per_page)
    }

    fn stream_url(&self, id: VideoId) -> String {
        format!("{}/videos/{id}/stream", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        assert_eq!(
            normalize_base_url("localhost:8000/api/").unwrap(),
            "http://localhost:8000/api"
        );
        assert_eq!(
            normalize_base_url("https://videos.example.org").unwrap(),
            "https://videos.example.org"
        );
        assert!(normalize_base_url("http://exa mple.com").is_err());
    }

    #[test]
    fn test_stream_url() {
        let api = HttpLibraryApi::new("127.0.0.1:8000/api", Duration::from_secs(10)).unwrap();
        assert_eq!(api.stream_url(12), "http://127.0.0.1:8000/api/videos/12/stream");
    }

    #[test]
    fn test_video_record_conversion() {
        let json = r#"{
            "id": 5,
            "filename": "trip.mp4",
            "filepath": "/videos/trip.mp4",
            "size": 2048.0,
            "duration": 95.5,
            "thumbnail_path": "covers/trip.mp4.jpg",
            "is_favorite": true,
            "web_playable": false,
            "created_at": "2024-03-01T10:20:30.123456",
            "updated_at": "2024-03-01T10:20:30",
            "tags": [{"id": 1, "name": "travel"}, {"id": 2, "name": "family"}]
        }"#;
        let record: VideoRecord = serde_json::from_str(json).unwrap();
        let video = VideoSummary::from(record);

        assert_eq!(video.size, 2048);
        assert_eq!(video.tags, vec!["travel".to_string(), "family".to_string()]);
        assert_eq!(video.cover.as_deref(), Some("covers/trip.mp4.jpg"));
        assert!(!video.web_playable);
        assert!(video.created_at.is_some());
        assert!(video.last_watched_at.is_none());
    }

    #[test]
    fn test_page_size_record() {
        let record: PageSizeRecord = serde_json::from_str(r#"{"videos_per_page": 36}"#).unwrap();
        assert_eq!(record.videos_per_page, 36);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2024-03-01T10:20:30Z").is_some());
        assert!(parse_timestamp("2024-03-01T10:20:30+02:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:20:30").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
