//! Small display helpers shared by the status and cache commands

use chrono::{DateTime, Local};

/// Format epoch milliseconds as local `YYYY-MM-DD HH:MM`.
///
/// Returns "N/A" for out-of-range timestamps.
pub fn format_timestamp_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Format an age in milliseconds, coarsest two units.
///
/// # Example output
/// - `just now`
/// - `4m 10s`
/// - `2h 5m`
pub fn format_age(age_ms: i64) -> String {
    let secs = age_ms.max(0) / 1000;
    if secs == 0 {
        return "just now".to_string();
    }

    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
