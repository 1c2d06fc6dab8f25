//! Interactive setup wizard for first-time configuration

use super::{DEFAULT_SERVER_URL, VidshelfConfig};
use config::ConfigError;
use dialoguer::{Input, theme::ColorfulTheme};

/// Interactive first-time setup - prompts for the server address and page size
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - User input cannot be read
/// - The configuration cannot be saved
pub fn first_time_setup() -> Result<VidshelfConfig, ConfigError> {
    println!("Welcome to vidshelf! Let's connect to your video library.\n");

    let server_url: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Library server URL")
        .default(DEFAULT_SERVER_URL.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                Err("Server URL must not be empty".to_string())
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let page_size: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Videos per page")
        .default(crate::query::DEFAULT_PAGE_SIZE)
        .interact_text()
        .map_err(|e| ConfigError::Message(format!("Failed to read input: {e}")))?;

    let config = VidshelfConfig {
        server_url: server_url.trim().to_string(),
        page_size: page_size.max(1),
        ..VidshelfConfig::default()
    };

    config.save()?;

    println!("\nConfiguration saved successfully!");
    Ok(config)
}
