//! Single-video commands - delete, rename, favorite, tag, progress

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;

use super::{Context, Result};
use crate::api::ApiError;
use crate::models::VideoId;
use crate::mutate::DeleteOutcome;
use crate::output;
use crate::tags::{DebouncedTagEditor, TagField};
use crate::ui::{AssumeYes, Confirmer, DialoguerConfirmer};

/// Delete a video, asking first unless `yes`
pub async fn delete(ctx: &Context, id: VideoId, yes: bool) -> Result<()> {
    ctx.load_page().await;

    let confirmer: Arc<dyn Confirmer> = if yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(DialoguerConfirmer::new())
    };

    match ctx.mutator(confirmer).delete(id).await {
        DeleteOutcome::Deleted { .. } => Ok(()),
        DeleteOutcome::Cancelled => {
            if !ctx.quiet {
                println!("{}", "Cancelled.".dimmed());
            }
            Ok(())
        }
        DeleteOutcome::Failed(e) => Err(e.into()),
    }
}

/// Rename a video file
pub async fn rename(ctx: &Context, id: VideoId, name: &str) -> Result<()> {
    ctx.load_page().await;

    let outcome = ctx.mutator(Arc::new(AssumeYes)).rename(id, name).await;
    if outcome.success {
        ctx.notifier.success(&format!("Renamed to '{}'", name.trim()));
        return Ok(());
    }

    let error = outcome
        .error
        .unwrap_or_else(|| ApiError::Rejected("Rename failed".to_string()));
    ctx.notifier
        .error(&format!("Failed to rename video: {}", error.user_message()));
    Err(error.into())
}

/// Set or clear the favorite mark
pub async fn favorite(ctx: &Context, id: VideoId, on: bool) -> Result<()> {
    ctx.load_page().await;

    ctx.mutator(Arc::new(AssumeYes)).set_favorite(id, on).await?;
    ctx.notifier.success(if on {
        "Added to favorites"
    } else {
        "Removed from favorites"
    });
    Ok(())
}

/// Set or clear the browser-playable flag
pub async fn playable(ctx: &Context, id: VideoId, on: bool) -> Result<()> {
    ctx.load_page().await;

    ctx.mutator(Arc::new(AssumeYes)).set_web_playable(id, on).await?;
    ctx.notifier.success(if on {
        "Marked as playable in the browser"
    } else {
        "Marked as needing transcoding"
    });
    Ok(())
}

/// Replace a video's tags
///
/// One-shot edits skip the debounce window; the input is still normalised
/// and unknown tags are created.
pub async fn tag(ctx: &Context, id: VideoId, tags: &str) -> Result<()> {
    ctx.load_page().await;

    let mutator = ctx.mutator(Arc::new(AssumeYes));
    let editor = DebouncedTagEditor::with_window(mutator, Duration::ZERO);
    let field = TagField::new(tags);
    editor.edit(id, field.clone());
    editor.wait_idle().await;
    if let Some(Err(e)) = editor.take_outcome(id) {
        return Err(e.into());
    }

    if ctx.quiet {
        println!("{}", field.text());
    }
    Ok(())
}

/// Print a video's stored playback progress
pub async fn progress(ctx: &Context, id: VideoId) -> Result<()> {
    let snapshot = match ctx.engine.api().get_progress(id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            ctx.notifier
                .error(&format!("Failed to load progress: {}", e.user_message()));
            return Err(e.into());
        }
    };

    let Some(snapshot) = snapshot else {
        if !ctx.quiet {
            println!("No progress recorded for video {id}.");
        }
        return Ok(());
    };

    if ctx.quiet {
        println!(
            "{}\t{:.3}\t{}",
            snapshot.last_position, snapshot.watch_progress, snapshot.is_completed
        );
        return Ok(());
    }

    println!(
        "Position:  {} ({:.0}%)",
        output::format_duration(snapshot.last_position),
        snapshot.watch_progress * 100.0
    );
    if snapshot.is_completed {
        println!("Status:    {}", "✓ completed".green());
    }
    if let Some(at) = snapshot.last_watched_at {
        println!("Watched:   {}", output::format_timestamp(at));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VidshelfError;
    use crate::api::{MockLibraryApi, MockOp};
    use crate::config::VidshelfConfig;
    use crate::prefs::MemoryPreferences;
    use crate::testing::sample_videos;

    fn context(api: Arc<MockLibraryApi>) -> Context {
        Context::new(
            api,
            Arc::new(MemoryPreferences::default()),
            VidshelfConfig::default(),
            true,
            Some("sort=filename"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_delete_with_yes() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(3)));
        let ctx = context(api.clone());

        delete(&ctx, 2, true).await.unwrap();

        assert_eq!(api.videos().len(), 2);
        assert!(ctx.engine.item(2).is_none());
    }

    #[tokio::test]
    async fn test_rename_failure_is_error() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(3)));
        let ctx = context(api.clone());

        assert!(rename(&ctx, 1, "video-02.mp4").await.is_err());
        rename(&ctx, 1, "renamed.mp4").await.unwrap();
        assert_eq!(ctx.engine.item(1).unwrap().filename, "renamed.mp4");
    }

    #[tokio::test]
    async fn test_tag_without_debounce() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(3)));
        let ctx = context(api.clone());

        tag(&ctx, 3, "b, a, b").await.unwrap();

        assert_eq!(api.count(MockOp::SetTags), 1);
        assert_eq!(ctx.engine.item(3).unwrap().tags, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_rejected_tag_update_is_error() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(3)));
        let ctx = context(api.clone());
        api.fail(MockOp::SetTags, ApiError::status(422));

        let result = tag(&ctx, 1, "cats").await;

        assert!(matches!(
            result,
            Err(VidshelfError::ApiError(ApiError::Status { status: 422, .. }))
        ));
        assert!(ctx.engine.item(1).unwrap().tags.is_empty());
    }

    #[tokio::test]
    async fn test_failed_tag_creation_is_error() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(3)));
        let ctx = context(api.clone());
        api.fail(MockOp::CreateTag, ApiError::Timeout);

        assert!(tag(&ctx, 2, "brand-new").await.is_err());
        assert_eq!(api.count(MockOp::SetTags), 0);
    }

    #[tokio::test]
    async fn test_favorite_off() {
        let mut videos = sample_videos(2);
        videos[0].is_favorite = true;
        let api = Arc::new(MockLibraryApi::new(videos));
        let ctx = context(api.clone());

        favorite(&ctx, 1, false).await.unwrap();

        assert!(!api.videos()[0].is_favorite);
    }

    #[tokio::test]
    async fn test_playable_failure_is_error() {
        let api = Arc::new(MockLibraryApi::new(sample_videos(2)));
        let ctx = context(api.clone());
        api.fail(MockOp::WebPlayable, ApiError::status(500));

        assert!(playable(&ctx, 2, false).await.is_err());
        assert!(ctx.engine.item(2).unwrap().web_playable);

        api.recover(MockOp::WebPlayable);
        playable(&ctx, 2, false).await.unwrap();
        assert!(!api.videos()[1].web_playable);
    }
}
