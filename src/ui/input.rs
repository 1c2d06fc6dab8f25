//! Yes/no confirmation
//!
//! Destructive operations ask a [`Confirmer`] first. A declined prompt is an
//! ordinary answer, not an error.

use std::io;

use async_trait::async_trait;

/// Result type for user input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors that can occur during user input
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// IO error during input
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Asks the user to confirm an action
#[async_trait]
pub trait Confirmer: Send + Sync {
    /// `Ok(false)` when the user declines or dismisses the prompt
    ///
    /// # Errors
    ///
    /// Returns `InputError` if the prompt cannot be shown.
    async fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Terminal confirmation using dialoguer
pub struct DialoguerConfirmer {
    default: bool,
}

impl DialoguerConfirmer {
    /// Prompt that defaults to "no"
    #[must_use]
    pub const fn new() -> Self {
        Self { default: false }
    }
}

impl Default for DialoguerConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Confirmer for DialoguerConfirmer {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        let prompt = prompt.to_string();
        let default = self.default;

        let answer = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
                .with_prompt(prompt)
                .default(default)
                .interact_opt()
        })
        .await
        .map_err(io::Error::other)?
        .map_err(io::Error::other)?;

        Ok(answer.unwrap_or(false))
    }
}

/// Confirms everything, for `--yes` and scripted use
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}
