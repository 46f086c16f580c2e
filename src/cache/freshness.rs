//! Freshness policy for cached contribution data

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Check whether data generated at `generated_at` (epoch ms) is still usable.
pub fn is_fresh(generated_at: Option<i64>, ttl: Duration) -> bool {
    is_fresh_at(generated_at, ttl, now_millis())
}

/// Same as [`is_fresh`] against an explicit `now` (epoch ms).
///
/// Absent or out-of-range timestamps are never fresh. Otherwise the entry is
/// fresh iff `now - generated_at < ttl`.
pub fn is_fresh_at(generated_at: Option<i64>, ttl: Duration, now: i64) -> bool {
    let Some(generated_at) = generated_at else {
        return false;
    };
    if DateTime::<Utc>::from_timestamp_millis(generated_at).is_none() {
        return false;
    }
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.saturating_sub(generated_at) < ttl_ms
}

/// Whole minutes elapsed since `generated_at`.
pub fn age_minutes(generated_at: i64, now: i64) -> i64 {
    now.saturating_sub(generated_at) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_736_935_200_000; // 2025-01-15T10:00:00Z

    #[test]
    fn test_absent_timestamp_is_stale() {
        assert!(!is_fresh_at(None, Duration::from_secs(3600), NOW));
        assert!(!is_fresh(None, Duration::MAX));
    }

    #[test]
    fn test_out_of_range_timestamp_is_stale() {
        assert!(!is_fresh_at(Some(i64::MAX), Duration::from_secs(3600), NOW));
    }

    #[test]
    fn test_fresh_within_ttl() {
        let generated = NOW - 4 * 60_000;
        assert!(is_fresh_at(Some(generated), Duration::from_secs(300), NOW));
    }

    #[test]
    fn test_boundary_is_stale() {
        // now - generated == ttl is not strictly less than ttl
        let generated = NOW - 300_000;
        assert!(!is_fresh_at(Some(generated), Duration::from_secs(300), NOW));
        assert!(is_fresh_at(Some(generated + 1), Duration::from_secs(300), NOW));
    }

    #[test]
    fn test_matches_formula_across_grid() {
        for age_ms in [0_i64, 1, 59_999, 60_000, 299_999, 300_000, 3_600_000] {
            for ttl_secs in [0_u64, 60, 300, 3600] {
                let expected = age_ms < (ttl_secs as i64) * 1000;
                assert_eq!(
                    is_fresh_at(Some(NOW - age_ms), Duration::from_secs(ttl_secs), NOW),
                    expected,
                    "age={age_ms} ttl={ttl_secs}"
                );
            }
        }
    }

    #[test]
    fn test_zero_ttl_never_fresh() {
        assert!(!is_fresh_at(Some(NOW), Duration::ZERO, NOW));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        assert!(is_fresh_at(Some(NOW + 60_000), Duration::from_secs(60), NOW));
    }

    #[test]
    fn test_age_minutes() {
        assert_eq!(age_minutes(NOW - 12 * 60_000 - 5_000, NOW), 12);
        assert_eq!(age_minutes(NOW, NOW), 0);
    }
}
