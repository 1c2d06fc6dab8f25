//! Vidshelf - list-state engine and client for a personal video library
//!
//! This library keeps the filter, sort and paging state of a video list in
//! step with a shareable query string, fetches pages from the library
//! server, and applies item edits (delete, rename, favorite, tags, covers,
//! playback progress) to the loaded page.

use thiserror::Error;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod mutate;
pub mod output;
pub mod playback;
pub mod prefs;
pub mod query;
pub mod seed;
pub mod settings;
pub mod tags;
pub mod ui;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum VidshelfError {
    /// Library server error
    #[error("Server error: {0}")]
    ApiError(#[from] api::ApiError),
    /// Preference store error
    #[error("Preference store error: {0}")]
    PrefsError(#[from] prefs::PrefsError),
    /// List engine misconfiguration
    #[error("Engine error: {0}")]
    EngineError(#[from] engine::EngineError),
    /// Cover capture error
    #[error("Capture error: {0}")]
    CaptureError(#[from] playback::CaptureError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Prompt error
    #[error("Input error: {0}")]
    InputError(#[from] ui::InputError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl VidshelfError {
    /// Whether a notice describing this error was already shown
    ///
    /// Server errors are reported through the notifier where they happen.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::ApiError(_) | Self::CaptureError(_))
    }
}
