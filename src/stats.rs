//! Contribution summary statistics

use serde::Serialize;

use crate::client::models::ContributionDay;

/// Aggregate view of a contribution sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: u64,
    pub active_days: usize,
    pub longest_streak: usize,
    pub current_streak: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_day: Option<ContributionDay>,
}

impl Summary {
    /// Summarise `days`, which must be in ascending date order.
    ///
    /// A streak is a run of consecutive calendar days with at least one
    /// contribution. The current streak ends on the last day, or on the day
    /// before it when the last day has no contributions yet.
    pub fn from_days(days: &[ContributionDay]) -> Self {
        let total = days.iter().map(|d| u64::from(d.contribution_count)).sum();
        let active_days = days.iter().filter(|d| d.contribution_count > 0).count();

        // Earliest date wins ties
        let best_day = days
            .iter()
            .filter(|d| d.contribution_count > 0)
            .fold(None::<&ContributionDay>, |best, d| match best {
                Some(b) if b.contribution_count >= d.contribution_count => Some(b),
                _ => Some(d),
            })
            .cloned();

        Self {
            total,
            active_days,
            longest_streak: longest_streak(days),
            current_streak: current_streak(days),
            best_day,
        }
    }
}

fn follows(prev: &ContributionDay, next: &ContributionDay) -> bool {
    prev.date.succ_opt() == Some(next.date)
}

fn longest_streak(days: &[ContributionDay]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<&ContributionDay> = None;

    for day in days {
        if day.contribution_count == 0 {
            run = 0;
        } else if prev.is_some_and(|p| p.contribution_count > 0 && follows(p, day)) {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

fn current_streak(days: &[ContributionDay]) -> usize {
    let mut rest = days;
    if let Some((last, init)) = rest.split_last()
        && last.contribution_count == 0
    {
        rest = init;
    }

    let mut streak = 0;
    let mut next: Option<&ContributionDay> = None;
    for day in rest.iter().rev() {
        if day.contribution_count == 0 || next.is_some_and(|n| !follows(day, n)) {
            break;
        }
        streak += 1;
        next = Some(day);
    }
    streak
}
