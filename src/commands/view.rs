//! View command - show or set the list layout

use super::{Context, Result};
use crate::query::ViewMode;

/// Execute the view command
///
/// Without a mode, prints the stored layout.
pub fn execute(ctx: &Context, mode: Option<ViewMode>) -> Result<()> {
    match mode {
        Some(mode) => {
            ctx.engine.change_view_mode(mode);
            ctx.notifier.success(&format!("View mode set to {mode}"));
        }
        None => {
            let mode = ctx.prefs.view_mode()?.unwrap_or_default();
            println!("{mode}");
        }
    }
    Ok(())
}
