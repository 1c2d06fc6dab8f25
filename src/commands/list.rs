//! List command - show one page of the library

use colored::Colorize;

use super::{Context, Result};
use crate::cli::ListArgs;
use crate::output;

/// Execute the list command
///
/// The engine is mounted on `--query` (or the saved search), then the flags
/// are applied the way a user would click through the list view.
pub async fn execute(ctx: &Context, args: &ListArgs) -> Result<()> {
    ctx.sync_settings().await;
    ctx.engine.mount().await?;

    if let Some(page_size) = args.page_size {
        ctx.engine.change_page_size(page_size).await?;
    }
    let patch = args.patch();
    if !patch.is_empty() {
        ctx.engine.set_filter(patch).await?;
    }
    if let Some(page) = args.page {
        ctx.engine.change_page(page).await?;
    }
    if args.reshuffle {
        ctx.engine.reshuffle().await?;
    }

    print_page(ctx);
    Ok(())
}

fn print_page(ctx: &Context) {
    let model = ctx.engine.read_model();

    if model.is_empty() {
        if !ctx.quiet {
            println!("No videos match.");
        }
    } else {
        for video in &model.items {
            println!("{}", output::video_line(video, ctx.quiet));
        }
    }

    if !ctx.quiet {
        let filter = ctx.engine.filter();
        println!();
        let footer = output::page_footer(
            &filter,
            model.total,
            ctx.engine.total_pages(),
            &ctx.share_query(),
        );
        println!("{}", footer.dimmed());
    }
}
