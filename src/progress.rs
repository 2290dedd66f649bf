//! Progress-line rendering for the batch loop.
//!
//! The batch keeps a single console line updated in place; these helpers
//! compute its fields so the formatting stays testable without a terminal.

use std::time::Duration;

/// Maximum width of the display path inside the progress line.
pub(crate) const PATH_DISPLAY_WIDTH: usize = 40;

/// Formats a duration as whole minutes and seconds, rounded to the second.
pub(crate) fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs_f64().round() as u64;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}m {seconds:02}s")
}

/// Truncates a display path to `width` characters, keeping the tail and
/// marking the cut with a leading ellipsis.
pub(crate) fn truncate_path(display: &str, width: usize) -> String {
    let chars: Vec<char> = display.chars().collect();
    if chars.len() <= width {
        return display.to_string();
    }

    let keep = width.saturating_sub(1);
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("…{tail}")
}

/// Estimates remaining time from the rolling average over processed files.
///
/// Returns None until at least one file has been processed.
pub(crate) fn estimate_remaining(
    elapsed: Duration,
    processed: usize,
    total: usize,
) -> Option<Duration> {
    if processed == 0 {
        return None;
    }

    let avg = elapsed / processed as u32;
    Some(avg * total.saturating_sub(processed) as u32)
}

/// Renders the in-place progress line for the file currently being handled.
pub(crate) fn render_line(
    index: usize,
    total: usize,
    display_path: &str,
    elapsed: Duration,
    remaining: Option<Duration>,
) -> String {
    let percent = (index as f64 / total as f64) * 100.0;
    let path = truncate_path(display_path, PATH_DISPLAY_WIDTH);
    let remaining = match remaining {
        Some(d) => format_duration(d),
        None => "--".to_string(),
    };

    format!(
        "[{index}/{total}] {percent:.1}% | {path} | elapsed {} | remaining {remaining}",
        format_duration(elapsed)
    )
}
