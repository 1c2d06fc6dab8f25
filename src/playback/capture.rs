//! Turning a player frame into a cover image

use std::io::Cursor;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

use crate::api::ApiError;

/// JPEG quality used for covers
pub const COVER_JPEG_QUALITY: u8 = 95;

/// Why a cover capture did not happen
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No video is open")]
    NoActiveVideo,

    /// The player has no decoded frame yet
    #[error("Video is not ready yet, try again in a moment")]
    NotReady,

    #[error("Captured frame is blank")]
    BlankFrame,

    #[error("Failed to encode cover: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to upload cover: {0}")]
    Upload(#[from] ApiError),
}

impl CaptureError {
    /// Text shown to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Upload(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// A frame with every pixel black counts as a failed draw
#[must_use]
pub fn is_blank(frame: &RgbaImage) -> bool {
    frame.pixels().all(|p| p.0[..3].iter().all(|&c| c == 0))
}

/// Encode a frame as JPEG, dropping the alpha channel
///
/// # Errors
///
/// Returns `CaptureError::Encode` if the encoder fails.
pub fn encode_jpeg(frame: &RgbaImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let rgb = image::DynamicImage::ImageRgba8(frame.clone()).into_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out.into_inner())
}

/// Append a timestamp query so image caches fetch the new cover
#[must_use]
pub fn cache_busted(path: &str, now: DateTime<Utc>) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}t={}", now.timestamp_millis())
}
