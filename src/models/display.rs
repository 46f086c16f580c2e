//! Display model implementations for table and JSON output

use serde::Serialize;
use tabled::Tabled;

use crate::cache::CacheInfo;
use crate::client::ContributionDay;
use crate::output::formatters::{format_age, format_size};
use crate::stats::Summary;

/// One labelled figure in the fetch summary table.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SummaryRow {
    #[tabled(rename = "METRIC")]
    pub metric: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl SummaryRow {
    pub fn new(metric: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            value: value.into(),
        }
    }

    /// Rows describing `summary`
    pub fn from_summary(summary: &Summary) -> Vec<Self> {
        let best = summary
            .best_day
            .as_ref()
            .map(|d| format!("{} ({})", d.date, d.contribution_count))
            .unwrap_or_else(|| "-".to_string());

        vec![
            Self::new("Total contributions", summary.total.to_string()),
            Self::new("Active days", summary.active_days.to_string()),
            Self::new("Longest streak", plural_days(summary.longest_streak)),
            Self::new("Current streak", plural_days(summary.current_streak)),
            Self::new("Best day", best),
        ]
    }
}

fn plural_days(n: usize) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// Single day row, used by `fetch --format table` when asked for raw days.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DayDisplay {
    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "COUNT")]
    pub count: u32,
}

impl From<&ContributionDay> for DayDisplay {
    fn from(day: &ContributionDay) -> Self {
        Self {
            date: day.date.to_string(),
            count: day.contribution_count,
        }
    }
}

/// Cache entry state for one pipeline.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CacheDisplay {
    #[tabled(rename = "CACHE")]
    pub cache: String,

    #[tabled(rename = "ENTRY")]
    pub entry: String,

    #[tabled(rename = "DAYS")]
    pub days: String,

    #[tabled(rename = "AGE")]
    pub age: String,

    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "FRESH")]
    pub fresh: String,
}

impl CacheDisplay {
    pub fn new(cache: impl Into<String>, info: &CacheInfo) -> Self {
        let dash = || "-".to_string();
        Self {
            cache: cache.into(),
            entry: if info.exists { "present" } else { "none" }.to_string(),
            days: info.days_count.map(|n| n.to_string()).unwrap_or_else(dash),
            age: info.age_ms.map(format_age).unwrap_or_else(dash),
            size: info.size_bytes.map(format_size).unwrap_or_else(dash),
            fresh: match info.is_fresh {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => dash(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::day;

    #[test]
    fn test_summary_rows() {
        let summary = Summary::from_days(&[day("2025-01-14", 2), day("2025-01-15", 5)]);
        let rows = SummaryRow::from_summary(&summary);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].value, "7");
        assert_eq!(rows[2].value, "2 days");
        assert_eq!(rows[4].value, "2025-01-15 (5)");
    }

    #[test]
    fn test_summary_rows_without_activity() {
        let rows = SummaryRow::from_summary(&Summary::default());
        assert_eq!(rows[3].value, "0 days");
        assert_eq!(rows[4].value, "-");
    }

    #[test]
    fn test_day_display() {
        let display = DayDisplay::from(&day("2025-01-15", 3));
        assert_eq!(display.date, "2025-01-15");
        assert_eq!(display.count, 3);
    }

    #[test]
    fn test_cache_display_absent() {
        let display = CacheDisplay::new("widget", &CacheInfo::default());
        assert_eq!(display.entry, "none");
        assert_eq!(display.days, "-");
        assert_eq!(display.fresh, "-");
    }

    #[test]
    fn test_cache_display_present() {
        let info = CacheInfo {
            exists: true,
            age_ms: Some(250_000),
            size_bytes: Some(2048),
            days_count: Some(365),
            is_fresh: Some(true),
        };
        let display = CacheDisplay::new("backend", &info);

        assert_eq!(display.entry, "present");
        assert_eq!(display.days, "365");
        assert_eq!(display.age, "4m 10s");
        assert_eq!(display.size, "2.00 KB");
        assert_eq!(display.fresh, "yes");
    }
}
