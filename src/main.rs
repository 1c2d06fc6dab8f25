//! Vidshelf CLI application entry point
//!
//! Command-line client for a personal video library server. It lists
//! pages of videos with the same filters, sorting and share queries as the
//! web list view, and edits videos in place.
//!
//! # Usage
//!
//! ```bash
//! # Show the first page (restores the last search when no query is given)
//! vidshelf
//! vidshelf list --sort size --favorites
//!
//! # Open a shared query
//! vidshelf list --query "tags=3&sort=random&page=2"
//!
//! # Edit videos
//! vidshelf tag 42 "cats, holiday"
//! vidshelf rename 42 holiday-cats.mp4
//! vidshelf delete 42
//!
//! # Try it without a server
//! vidshelf --demo list
//! ```
//!
//! # Configuration
//!
//! On first run, vidshelf will prompt for the server address. Configuration is
//! stored in the user's config directory (`~/.config/vidshelf/config.toml` on
//! Linux).

use std::sync::Arc;

use colored::Colorize;
use tracing::debug;
use vidshelf::{
    VidshelfError,
    api::{HttpLibraryApi, LibraryApi},
    cli::{Cli, Commands},
    commands::{self, Context},
    config::VidshelfConfig,
    logging,
    prefs::{MemoryPreferences, PreferenceStore, SledPreferences},
};

type Result<T> = std::result::Result<T, VidshelfError>;

/// Main entry point for the vidshelf application
#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        if !e.is_reported() {
            eprintln!("{} {e}", "❌".red());
        }
        std::process::exit(1);
    }
}

/// Load configuration, connect and dispatch to the command handler
///
/// # Errors
///
/// Returns `VidshelfError` if configuration loading fails, the preference
/// store cannot be opened, or any command handler returns an error.
async fn run(cli: Cli) -> Result<()> {
    let mut config = if cli.demo {
        VidshelfConfig::default()
    } else {
        VidshelfConfig::load_or_setup()?
    };
    if let Some(server) = &cli.server {
        config.server_url.clone_from(server);
    }
    let quiet = cli.quiet || config.quiet;
    let command = cli.get_command();

    let (api, prefs): (Arc<dyn LibraryApi>, Arc<dyn PreferenceStore>) = if cli.demo {
        debug!("using the built-in demo library");
        (
            Arc::new(commands::demo_library()),
            Arc::new(MemoryPreferences::default()),
        )
    } else {
        let api = HttpLibraryApi::new(&config.server_url, config.request_timeout())
            .map_err(|e| {
                VidshelfError::InvalidInput(format!(
                    "Invalid server URL '{}': {e}",
                    config.server_url
                ))
            })?;
        debug!(server = %api.base_url(), "connecting to library server");
        (
            Arc::new(api),
            Arc::new(SledPreferences::open(config.prefs_path()?)?),
        )
    };

    let query = match &command {
        Commands::List(args) => args.query.as_deref(),
        _ => None,
    };
    let ctx = Context::new(api, prefs, config, quiet, query)?;

    match &command {
        Commands::List(args) => commands::list(&ctx, args).await,
        Commands::Delete { id, yes } => commands::video::delete(&ctx, *id, *yes).await,
        Commands::Rename { id, name } => commands::video::rename(&ctx, *id, name).await,
        Commands::Favorite { id, off } => commands::video::favorite(&ctx, *id, !off).await,
        Commands::Playable { id, off } => commands::video::playable(&ctx, *id, !off).await,
        Commands::Tag { id, tags } => commands::video::tag(&ctx, *id, tags).await,
        Commands::Progress { id } => commands::video::progress(&ctx, *id).await,
        Commands::Tags => commands::tags(&ctx).await,
        Commands::View { mode } => commands::view(&ctx, *mode),
    }
}
