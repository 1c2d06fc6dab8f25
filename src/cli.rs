//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for vidshelf using the `clap` crate.
//!
//! # Commands
//!
//! - **list**: Show one page of the library, filtered and sorted
//! - **delete**, **rename**, **favorite**, **tag**: Edit a video
//! - **progress**: Show a video's playback progress
//! - **tags**: Show the tag vocabulary
//! - **view**: Show or set the preferred list layout
//!
//! # Examples
//!
//! ```bash
//! vidshelf list --sort size --tags 3,8 --page 2
//! vidshelf list --query "search=cat&sort=random&page=2"
//! vidshelf tag 42 "cats, holiday"
//! vidshelf --demo list --favorites
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::models::{TagId, VideoId};
use crate::query::{DurationBucket, FilterPatch, SortMode, ViewMode};

/// Filter, sort and paging flags of the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Start from a share query such as `tags=3&sort=random&page=2`
    #[arg(long = "query", value_name = "QUERY")]
    pub query: Option<String>,

    /// Keyword matched against file names
    #[arg(short = 's', long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Only favorites
    #[arg(short = 'f', long = "favorites")]
    pub favorites: bool,

    /// Comma-separated tag ids; videos must carry all of them
    #[arg(short = 't', long = "tags", value_name = "IDS", value_delimiter = ',')]
    pub tags: Vec<TagId>,

    /// Length bucket
    #[arg(short = 'd', long = "duration", value_enum)]
    pub duration: Option<DurationBucket>,

    /// Sort order
    #[arg(long = "sort", value_enum)]
    pub sort: Option<SortMode>,

    /// Page to show, starting at 1
    #[arg(short = 'p', long = "page", value_name = "N")]
    pub page: Option<u32>,

    /// Videos per page (overrides config)
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u32>,

    /// Draw a new random order
    #[arg(long = "reshuffle")]
    pub reshuffle: bool,
}

impl ListArgs {
    /// Filter changes requested by the flags
    #[must_use]
    pub fn patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::default();
        if let Some(search) = &self.search {
            patch = patch.keyword(search.clone());
        }
        if self.favorites {
            patch = patch.only_favorites(true);
        }
        if !self.tags.is_empty() {
            patch = patch.tag_ids(self.tags.iter().copied());
        }
        if self.duration.is_some() {
            patch = patch.duration(self.duration);
        }
        if let Some(sort) = self.sort {
            patch = patch.sort(sort);
        }
        patch
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show a page of videos
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Delete a video from the library
    #[command(visible_alias = "rm")]
    Delete {
        id: VideoId,

        /// Do not ask for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Rename a video file
    #[command(visible_alias = "mv")]
    Rename { id: VideoId, name: String },

    /// Mark a video as favorite
    #[command(visible_alias = "fav")]
    Favorite {
        id: VideoId,

        /// Remove the mark instead
        #[arg(long = "off")]
        off: bool,
    },

    /// Mark a video as playable in the browser without transcoding
    Playable {
        id: VideoId,

        /// Mark it as needing transcoding instead
        #[arg(long = "off")]
        off: bool,
    },

    /// Replace a video's tags with a comma-separated list
    #[command(visible_alias = "t")]
    Tag { id: VideoId, tags: String },

    /// Show a video's playback progress
    Progress { id: VideoId },

    /// List all known tags
    Tags,

    /// Show or set the list layout
    View {
        #[arg(value_enum)]
        mode: Option<ViewMode>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "vidshelf")]
#[command(about = "Browse and curate a personal video library", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// More log output; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Library server URL (overrides config)
    #[arg(long = "server", value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Use a built-in sample library instead of a server
    #[arg(long = "demo", global = true)]
    pub demo: bool,
}

impl Cli {
    /// Parse command line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command to execute, defaulting to `list`
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::List(ListArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vidshelf").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_command_is_list() {
        let cli = parse(&[]);
        assert!(matches!(cli.get_command(), Commands::List(_)));
    }

    #[test]
    fn test_list_flags_become_patch() {
        let cli = parse(&[
            "list", "-s", "cat", "--tags", "3,8", "--sort", "created_at", "-d", "short",
        ]);
        let Commands::List(args) = cli.get_command() else {
            panic!("expected list");
        };

        let patch = args.patch();
        assert_eq!(patch.keyword.as_deref(), Some("cat"));
        assert_eq!(patch.tag_ids, Some([3, 8].into_iter().collect()));
        assert_eq!(patch.sort, Some(SortMode::CreatedAt));
        assert_eq!(patch.duration, Some(Some(DurationBucket::Short)));
        assert_eq!(patch.only_favorites, None);
    }

    #[test]
    fn test_no_flags_is_empty_patch() {
        assert!(ListArgs::default().patch().is_empty());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["-vv", "--demo", "delete", "4", "--yes"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.demo);
        assert!(matches!(cli.get_command(), Commands::Delete { id: 4, yes: true }));
    }

    #[test]
    fn test_view_mode_argument() {
        let cli = parse(&["view", "list"]);
        assert!(matches!(
            cli.get_command(),
            Commands::View {
                mode: Some(ViewMode::List)
            }
        ));
    }
}
