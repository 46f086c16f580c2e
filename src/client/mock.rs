//! Synthetic contribution data
//!
//! Last resort of the widget chain so the heatmap always has something to
//! draw. Output is never cached.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use rand::Rng;

use super::models::{ContributionDay, ContributionSet};
use super::{ContributionSource, SourceKind};
use crate::error::FetchError;

/// Number of days in a generated year
pub const MOCK_DAYS: u32 = 365;

/// Source that fabricates one year of plausible-looking activity.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    /// One year of days ending on today's local date.
    pub fn generate(&self) -> ContributionSet {
        generate_until(Local::now().date_naive(), &mut rand::thread_rng())
    }
}

#[async_trait]
impl ContributionSource for MockGenerator {
    fn kind(&self) -> SourceKind {
        SourceKind::Mock
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn fetch(
        &self,
        _username: &str,
        _token: Option<&str>,
    ) -> Result<ContributionSet, FetchError> {
        Ok(self.generate())
    }
}

/// Contiguous [`MOCK_DAYS`] days, oldest first, the last one being `today`.
pub fn generate_until<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> ContributionSet {
    (0..MOCK_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(i64::from(back));
            ContributionDay::new(date, sample_count(rng))
        })
        .collect()
}

/// Tiered distribution: mostly idle days, small counts, rare bursts.
fn sample_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let roll: f64 = rng.r#gen();
    if roll < 0.70 {
        0
    } else if roll < 0.90 {
        rng.gen_range(1..=3)
    } else if roll < 0.98 {
        rng.gen_range(4..=9)
    } else {
        rng.gen_range(10..=20)
    }
}
