//! The media player a playback session drives

use image::RgbaImage;

/// What to load into a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub url: String,
    pub title: String,
    /// Browser-style players can decode it without transcoding
    pub web_playable: bool,
}

/// Synchronous control surface of a video player
///
/// Implementations wrap whatever actually decodes video. Frame dimensions
/// are `(0, 0)` until the first frame is known.
pub trait Player: Send {
    fn load(&mut self, source: &StreamSource);

    fn play(&mut self);

    fn pause(&mut self);

    /// Stop playback and release the current source
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Width and height of the decoded video
    fn frame_size(&self) -> (u32, u32);

    /// Draw the current frame to an offscreen image
    fn grab_frame(&mut self) -> Option<RgbaImage>;

    /// Current position in seconds
    fn position(&self) -> f64;

    /// Length of the loaded video in seconds
    fn duration(&self) -> f64;
}
