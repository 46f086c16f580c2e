//! Terminal contribution heatmap
//!
//! Seven weekday rows (Sunday first) by one column per week, like the
//! profile calendar.

use chrono::{Datelike, NaiveDate};
use colored::Colorize;

use crate::client::models::ContributionDay;

const CELL: &str = "■";
const WEEKDAY_LABELS: [&str; 7] = ["", "Mon", "", "Wed", "", "Fri", ""];
const LABEL_WIDTH: usize = 4;

/// Intensity thresholds derived from the non-zero counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    q1: u32,
    q2: u32,
    q3: u32,
}

impl Levels {
    /// Quartiles of the non-zero counts in `days`.
    pub fn from_days(days: &[ContributionDay]) -> Self {
        let mut counts: Vec<u32> = days
            .iter()
            .map(|d| d.contribution_count)
            .filter(|&c| c > 0)
            .collect();
        counts.sort_unstable();

        let quantile = |q: usize| -> u32 {
            if counts.is_empty() {
                return 0;
            }
            let idx = ((counts.len() - 1) * q) / 4;
            counts[idx]
        };

        Self {
            q1: quantile(1),
            q2: quantile(2),
            q3: quantile(3),
        }
    }

    /// 0 for no contributions, otherwise 1-4 by quartile.
    pub fn level(&self, count: u32) -> u8 {
        match count {
            0 => 0,
            c if c <= self.q1 => 1,
            c if c <= self.q2 => 2,
            c if c <= self.q3 => 3,
            _ => 4,
        }
    }
}

/// Week columns of per-weekday levels; `None` where no day was supplied.
pub fn grid(days: &[ContributionDay]) -> Vec<[Option<u8>; 7]> {
    let Some(first) = days.first() else {
        return Vec::new();
    };
    let levels = Levels::from_days(days);
    let start = week_start(first.date);

    let mut weeks: Vec<[Option<u8>; 7]> = Vec::new();
    for day in days {
        let offset = (day.date - start).num_days();
        if offset < 0 {
            continue;
        }
        let col = (offset / 7) as usize;
        let row = day.date.weekday().num_days_from_sunday() as usize;
        if weeks.len() <= col {
            weeks.resize(col + 1, [None; 7]);
        }
        weeks[col][row] = Some(levels.level(day.contribution_count));
    }
    weeks
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Month abbreviations positioned over the first week of each month.
fn month_header(start: NaiveDate, weeks: usize) -> String {
    let mut line = vec![' '; weeks * 2 + 3];
    let mut last_month = None;

    for col in 0..weeks {
        let sunday = start + chrono::Duration::days(col as i64 * 7);
        let month = sunday.month();
        if last_month == Some(month) {
            continue;
        }
        last_month = Some(month);

        let pos = col * 2;
        // Leave a gap after the previous label
        if pos > 0 && line[pos - 1] != ' ' {
            continue;
        }
        for (i, ch) in sunday.format("%b").to_string().chars().enumerate() {
            line[pos + i] = ch;
        }
    }
    line.into_iter().collect::<String>().trim_end().to_string()
}

fn paint(level: Option<u8>) -> String {
    match level {
        None => " ".to_string(),
        Some(0) => CELL.bright_black().to_string(),
        Some(1) => CELL.truecolor(155, 233, 168).to_string(),
        Some(2) => CELL.truecolor(64, 196, 99).to_string(),
        Some(3) => CELL.truecolor(48, 161, 78).to_string(),
        Some(_) => CELL.truecolor(33, 110, 57).to_string(),
    }
}

/// Render the heatmap with a month header and a legend.
pub fn render(days: &[ContributionDay]) -> String {
    let weeks = grid(days);
    let Some(first) = days.first() else {
        return "No contribution data.".to_string();
    };

    let mut out = String::new();
    out.push_str(&" ".repeat(LABEL_WIDTH));
    out.push_str(&month_header(week_start(first.date), weeks.len()));
    out.push('\n');

    for (row, label) in WEEKDAY_LABELS.iter().enumerate() {
        let cells: Vec<String> = weeks.iter().map(|week| paint(week[row])).collect();
        let line = format!("{:<width$}{}", label, cells.join(" "), width = LABEL_WIDTH);
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = (0..=4).map(|l| paint(Some(l))).collect();
    out.push_str(&format!(
        "{:>width$}Less {} More",
        "",
        legend.join(" "),
        width = LABEL_WIDTH
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{day, days_ending};

    #[test]
    fn test_levels_by_quartile() {
        let days: Vec<ContributionDay> = (1..=8)
            .map(|c| day(&format!("2025-01-{:02}", c), c))
            .collect();
        let levels = Levels::from_days(&days);

        assert_eq!(levels.level(0), 0);
        assert_eq!(levels.level(1), 1);
        assert_eq!(levels.level(8), 4);
        assert!(levels.level(4) <= levels.level(6));
    }

    #[test]
    fn test_levels_single_value() {
        let levels = Levels::from_days(&[day("2025-01-01", 5)]);
        assert_eq!(levels.level(5), 1);
        assert_eq!(levels.level(6), 4);
    }

    #[test]
    fn test_grid_places_days_by_weekday() {
        // 2025-01-15 is a Wednesday
        let grid = grid(&[day("2025-01-15", 3), day("2025-01-19", 0)]);

        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][3], Some(1));
        assert_eq!(grid[0][0], None);
        assert_eq!(grid[1][0], Some(0));
    }

    #[test]
    fn test_year_spans_53_columns_at_most() {
        let days = days_ending("2025-01-15", 365);
        let grid = grid(&days);

        assert!((52..=53).contains(&grid.len()));
        let filled: usize = grid
            .iter()
            .map(|w| w.iter().filter(|c| c.is_some()).count())
            .sum();
        assert_eq!(filled, 365);
    }

    #[test]
    fn test_render_shape() {
        colored::control::set_override(false);
        let out = render(&days_ending("2025-01-15", 28));
        let lines: Vec<&str> = out.lines().collect();

        // Header, seven weekday rows, legend
        assert_eq!(lines.len(), 9);
        assert!(lines[2].starts_with("Mon"));
        assert!(lines[8].contains("Less"));
        assert!(lines[0].contains("Dec") || lines[0].contains("Jan"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "No contribution data.");
    }
}
