//! Tags command - list the tag vocabulary

use super::{Context, Result};
use crate::output;

/// Execute the tags command
pub async fn execute(ctx: &Context) -> Result<()> {
    if let Err(e) = ctx.engine.refresh_vocabulary().await {
        ctx.notifier
            .error(&format!("Failed to load tags: {}", e.user_message()));
        return Err(e.into());
    }

    let vocabulary = ctx.engine.vocabulary().read().clone();
    if vocabulary.is_empty() {
        if !ctx.quiet {
            println!("No tags yet.");
        }
        return Ok(());
    }

    if !ctx.quiet {
        println!("Tags:");
    }
    for tag in vocabulary.tags() {
        println!("{}", output::tag_line(tag, ctx.quiet));
    }
    Ok(())
}
