//! Player double for testing

use image::{Rgba, RgbaImage};

use super::player::{Player, StreamSource};

/// Player that shows a fixed frame and records what was asked of it
#[derive(Debug, Default)]
pub struct StillPlayer {
    pub loaded: Option<StreamSource>,
    pub playing: bool,
    pub frame: Option<RgbaImage>,
    pub position: f64,
    pub duration: f64,
    pub stops: usize,
}

impl StillPlayer {
    /// Player whose frames are `width`x`height` of a solid colour
    #[must_use]
    pub fn with_frame(width: u32, height: u32, colour: [u8; 4]) -> Self {
        Self {
            frame: Some(RgbaImage::from_pixel(width, height, Rgba(colour))),
            ..Self::default()
        }
    }

    /// Player that has not decoded anything yet
    #[must_use]
    pub fn not_ready() -> Self {
        Self::default()
    }
}

impl Player for StillPlayer {
    fn load(&mut self, source: &StreamSource) {
        self.loaded = Some(source.clone());
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.loaded = None;
        self.stops += 1;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frame.as_ref().map_or((0, 0), RgbaImage::dimensions)
    }

    fn grab_frame(&mut self) -> Option<RgbaImage> {
        self.frame.clone()
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}
