//! Playback modal: one open video, cover capture and progress reporting
//!
//! Closing the modal stops the player, which makes most players report a
//! "load aborted" error. Errors reported during the short close guard that
//! follows are swallowed instead of shown.

pub mod capture;
pub mod player;

#[cfg(test)]
pub mod mock;

pub use capture::{COVER_JPEG_QUALITY, CaptureError, cache_busted, encode_jpeg, is_blank};
pub use player::{Player, StreamSource};

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::ApiResult;
use crate::models::{ProgressUpdate, VideoId, VideoPatch, VideoSummary};
use crate::mutate::OptimisticMutator;

/// Repeated player errors inside this window produce one notice
const ERROR_REPEAT_WINDOW: Duration = Duration::from_secs(1);

/// Timings of a [`PlaybackSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    /// How long after `close` player errors are ignored
    pub close_guard: Duration,
    /// Pause before grabbing a frame so the decoder settles
    pub settle_delay: Duration,
    pub jpeg_quality: u8,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            close_guard: Duration::from_millis(100),
            settle_delay: Duration::from_millis(100),
            jpeg_quality: COVER_JPEG_QUALITY,
        }
    }
}

/// Drives a [`Player`] for the list's playback modal
pub struct PlaybackSession<P: Player> {
    player: P,
    mutator: OptimisticMutator,
    settings: PlaybackSettings,
    active: Option<VideoSummary>,
    visible: bool,
    closing_until: Option<Instant>,
    last_error_at: Option<Instant>,
}

impl<P: Player> PlaybackSession<P> {
    #[must_use]
    pub fn new(player: P, mutator: OptimisticMutator) -> Self {
        Self::with_settings(player, mutator, PlaybackSettings::default())
    }

    #[must_use]
    pub const fn with_settings(
        player: P,
        mutator: OptimisticMutator,
        settings: PlaybackSettings,
    ) -> Self {
        Self {
            player,
            mutator,
            settings,
            active: None,
            visible: false,
            closing_until: None,
            last_error_at: None,
        }
    }

    /// Load `video` into the player, show the modal and start playing
    pub fn open(&mut self, video: VideoSummary) {
        let source = StreamSource {
            url: self.mutator.engine().api().stream_url(video.id),
            title: video.filename.clone(),
            web_playable: video.web_playable,
        };
        if !source.web_playable {
            warn!(id = video.id, "video may need transcoding to play");
        }
        info!(id = video.id, url = %source.url, "opening video");

        self.player.load(&source);
        self.active = Some(video);
        self.visible = true;
        self.player.play();
    }

    /// Stop playback and hide the modal
    pub fn close(&mut self) {
        self.closing_until = Some(Instant::now() + self.settings.close_guard);
        self.player.stop();
        self.visible = false;
        if let Some(video) = self.active.take() {
            debug!(id = video.id, "closed video");
        }
    }

    /// Whether the close guard is still running
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing_until.is_some_and(|until| Instant::now() < until)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn active(&self) -> Option<&VideoSummary> {
        self.active.as_ref()
    }

    #[must_use]
    pub const fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Handle an error raised by the player
    ///
    /// Returns `true` when the error was shown (and the modal closed).
    pub fn report_player_error(&mut self, message: &str) -> bool {
        if self.is_closing() {
            debug!(message, "player error during close ignored");
            return false;
        }
        let now = Instant::now();
        if self
            .last_error_at
            .is_some_and(|at| now.duration_since(at) < ERROR_REPEAT_WINDOW)
        {
            debug!(message, "repeated player error ignored");
            return false;
        }
        self.last_error_at = Some(now);

        warn!(message, "video failed to load");
        self.mutator.engine().notifier().error("Video failed to load");
        self.close();
        true
    }

    /// Use the current frame as the open video's cover
    ///
    /// Playback resumes afterwards if it was running, whether or not the
    /// capture worked. Returns the new, cache-busted cover path.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::NotReady` without touching the network when
    /// the player has no frame yet, and the other variants when the frame
    /// is blank or cannot be encoded or uploaded.
    pub async fn capture_frame(&mut self) -> Result<String, CaptureError> {
        let Some(id) = self.active.as_ref().map(|v| v.id) else {
            return Err(CaptureError::NoActiveVideo);
        };
        let notifier = self.mutator.engine().notifier().clone();

        let (width, height) = self.player.frame_size();
        if width == 0 || height == 0 {
            notifier.warning(&CaptureError::NotReady.to_string());
            return Err(CaptureError::NotReady);
        }

        let was_playing = self.player.is_playing();
        self.player.pause();
        tokio::time::sleep(self.settings.settle_delay).await;

        let result = self.capture_and_upload(id).await;

        if was_playing {
            self.player.play();
        }

        match &result {
            Ok(cover) => {
                info!(id, cover = %cover, "cover updated");
                notifier.success("Cover updated");
            }
            Err(e) => {
                warn!(id, error = %e, "cover capture failed");
                notifier.error(&format!("Failed to update cover: {}", e.user_message()));
            }
        }
        result
    }

    async fn capture_and_upload(&mut self, id: VideoId) -> Result<String, CaptureError> {
        let frame = self.player.grab_frame().ok_or(CaptureError::NotReady)?;
        if is_blank(&frame) {
            return Err(CaptureError::BlankFrame);
        }
        let jpeg = encode_jpeg(&frame, self.settings.jpeg_quality)?;
        debug!(id, bytes = jpeg.len(), "uploading cover");

        self.mutator.engine().notifier().info("Saving cover...");
        let path = self.mutator.engine().api().upload_cover(id, jpeg).await?;

        let cover = cache_busted(&path, Utc::now());
        self.mutator.apply_patch(id, &VideoPatch::cover(cover.clone()));
        if let Some(active) = self.active.as_mut() {
            active.cover = Some(cover.clone());
        }
        Ok(cover)
    }

    /// Report the player's position for the open video
    ///
    /// The listed item's progress fields are then refreshed on a best-effort
    /// basis. Does nothing when no video is open.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the server rejects the report.
    pub async fn save_progress(&mut self) -> ApiResult<()> {
        let Some(id) = self.active.as_ref().map(|v| v.id) else {
            return Ok(());
        };
        let update = ProgressUpdate {
            position: self.player.position(),
            duration: self.player.duration(),
        };
        debug!(id, position = update.position, "saving progress");
        self.mutator.engine().api().put_progress(id, &update).await?;
        self.mutator.refresh_progress(id).await;
        Ok(())
    }

    /// Save progress, then close
    pub async fn finish(&mut self) {
        if let Err(e) = self.save_progress().await {
            warn!(error = %e, "could not save progress");
        }
        self.close();
    }
}
