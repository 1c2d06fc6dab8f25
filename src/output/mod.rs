//! Output formatting for CLI display
//!
//! This module renders list pages, tags and paging footers for the
//! terminal front end.

use byte_unit::{Byte, UnitType};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use crate::models::{Tag, VideoSummary};
use crate::query::FilterState;

/// Human readable file size, binary units
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let size = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{size:.1}")
}

/// `m:ss` below an hour, `h:mm:ss` above
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Local date and time of a server timestamp
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One list row: id, name, length, size, tags and watch state
#[must_use]
pub fn video_line(video: &VideoSummary, quiet: bool) -> String {
    if quiet {
        return format!("{}\t{}", video.id, video.filename);
    }

    let star = if video.is_favorite { "★".yellow().to_string() } else { " ".to_string() };
    let mut line = format!(
        "{star} {:>5}  {}  {}  {}",
        video.id.to_string().dimmed(),
        video.filename.bold(),
        format_duration(video.duration).cyan(),
        format_size(video.size).dimmed(),
    );

    if !video.tags.is_empty() {
        line.push_str(&format!("  [{}]", video.tags.join(", ")));
    }
    if video.is_completed {
        line.push_str(&format!("  {}", "✓ watched".green()));
    } else if video.watch_progress > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (video.watch_progress * 100.0).round() as u32;
        line.push_str(&format!("  {}", format!("{percent}%").dimmed()));
    }
    if !video.web_playable {
        line.push_str(&format!("  {}", "⚠️ needs transcoding".yellow()));
    }
    line
}

/// Detailed multi-line view of one video
#[must_use]
pub fn video_details(video: &VideoSummary) -> String {
    let mut out = format!("{}\n", video.filename.bold());
    out.push_str(&format!("  Id:        {}\n", video.id));
    out.push_str(&format!("  Length:    {}\n", format_duration(video.duration)));
    out.push_str(&format!("  Size:      {}\n", format_size(video.size)));
    out.push_str(&format!(
        "  Progress:  {} ({:.0}%)\n",
        format_duration(video.last_position),
        video.watch_progress * 100.0
    ));
    if let Some(at) = video.last_watched_at {
        out.push_str(&format!("  Watched:   {}\n", format_timestamp(at)));
    }
    if let Some(cover) = &video.cover {
        out.push_str(&format!("  Cover:     {cover}\n"));
    }
    out
}

/// Format a tag for display
#[must_use]
pub fn tag_line(tag: &Tag, quiet: bool) -> String {
    if quiet {
        format!("{}\t{}", tag.id, tag.name)
    } else {
        format!("  {:>4}  {}", tag.id.to_string().dimmed(), tag.name)
    }
}

/// "Page 2 of 5 (93 videos)" plus the share query when there is one
#[must_use]
pub fn page_footer(state: &FilterState, total: u64, total_pages: u64, share: &str) -> String {
    let mut out = format!(
        "Page {} of {} ({total} video{})",
        state.page,
        total_pages.max(1),
        if total == 1 { "" } else { "s" }
    );
    if !share.is_empty() {
        out.push_str(&format!("\n{} ?{share}", "Share:".dimmed()));
    }
    out
}
