//! Feed renderer
//!
//! Renders feed snapshots to plain text for the inspection binary.

use chrono::{DateTime, Utc};

use crate::app::{FeedPhase, FeedState};
use crate::domain::entities::Line;

/// Compact age of a line: minutes under an hour, hours under a day, then days
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes().max(0);
    if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / (24 * 60))
    }
}

/// Render a single line with its author, age, likes and viewer markers
pub fn render_line(line: &Line, now: DateTime<Utc>) -> String {
    let mut markers = String::new();
    if line.viewer_has_liked {
        markers.push_str(" [liked]");
    }
    if line.viewer_has_bookmarked {
        markers.push_str(" [saved]");
    }

    format!(
        "{}\n  @{} · {} · {} {}{}\n",
        line.text,
        line.author_display_name,
        time_ago(line.created_at, now),
        line.like_count,
        if line.like_count == 1 { "like" } else { "likes" },
        markers
    )
}

/// Render a feed snapshot, with the line of the day on top when there is one
pub fn render_feed(state: &FeedState, highlight: Option<&Line>, now: DateTime<Utc>) -> String {
    let mut buf = String::new();

    if let Some(line) = highlight {
        buf.push_str("== Line of the day ==\n\n");
        buf.push_str(&render_line(line, now));
        buf.push('\n');
    }

    match state.date_filter {
        Some(day) => buf.push_str(&format!("== Lines from {} ==\n\n", day)),
        None => buf.push_str("== Latest lines ==\n\n"),
    }

    match state.phase {
        FeedPhase::Errored => buf.push_str("_Could not load lines._\n"),
        _ if state.items.is_empty() => buf.push_str("_No lines yet._\n"),
        _ => {
            for line in &state.items {
                buf.push_str(&render_line(line, now));
                buf.push('\n');
            }
            if state.phase == FeedPhase::ErroredMore {
                buf.push_str("_Could not load more lines._\n");
            } else if state.has_more {
                buf.push_str("_More lines available._\n");
            }
        }
    }

    buf
}
