//! Per-operation summaries, recomputed from a bucket on every call.

use serde::{Deserialize, Serialize};

/// Rolling statistics for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub operation: String,
    pub count: usize,
    /// Mean duration rounded to the nearest millisecond.
    pub avg_duration: u64,
    pub min_duration: u64,
    pub max_duration: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

impl MetricsSummary {
    /// Summarize `durations` (any order). `None` when empty.
    pub fn from_durations(operation: impl Into<String>, durations: &[u64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        let mut sorted = durations.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u128 = sorted.iter().map(|&d| u128::from(d)).sum();
        let avg = (sum as f64 / count as f64).round() as u64;

        Some(Self {
            operation: operation.into(),
            count,
            avg_duration: avg,
            min_duration: sorted[0],
            max_duration: sorted[count - 1],
            p50: percentile(&sorted, 50.0),
            p90: percentile(&sorted, 90.0),
            p99: percentile(&sorted, 99.0),
        })
    }
}

/// Nearest-rank percentile over ascending `sorted` values.
///
/// `index = ceil(p / 100 * n) - 1`, clamped to the slice. Returns 0 for an
/// empty slice.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nearest_rank_no_interpolation() {
        let sorted = [10, 20, 30, 40, 50];
        assert_eq!(percentile(&sorted, 50.0), 30);
        assert_eq!(percentile(&sorted, 90.0), 50);
        assert_eq!(percentile(&sorted, 99.0), 50);
    }

    #[test]
    fn test_percentile_zero_clamps_to_first() {
        assert_eq!(percentile(&[7, 8, 9], 0.0), 7);
    }

    #[test]
    fn test_percentile_empty_is_zero() {
        assert_eq!(percentile(&[], 50.0), 0);
    }

    #[test]
    fn test_single_value_summary() {
        let s = MetricsSummary::from_durations("op", &[42]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!((s.min_duration, s.max_duration, s.avg_duration), (42, 42, 42));
        assert_eq!((s.p50, s.p90, s.p99), (42, 42, 42));
    }

    #[test]
    fn test_unsorted_input_and_rounding() {
        let s = MetricsSummary::from_durations("op", &[3, 1, 2, 2]).unwrap();
        assert_eq!(s.min_duration, 1);
        assert_eq!(s.max_duration, 3);
        // 8 / 4 = 2
        assert_eq!(s.avg_duration, 2);

        let s = MetricsSummary::from_durations("op", &[1, 2]).unwrap();
        // 1.5 rounds up
        assert_eq!(s.avg_duration, 2);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(MetricsSummary::from_durations("op", &[]).is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let s = MetricsSummary::from_durations("api.chat", &[5]).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["avgDuration"], 5);
        assert_eq!(json["operation"], "api.chat");
        assert!(json.get("p99").is_some());
    }

    proptest! {
        #[test]
        fn prop_percentiles_are_ordered_members(mut values in proptest::collection::vec(0u64..10_000, 1..200)) {
            let s = MetricsSummary::from_durations("op", &values).unwrap();
            values.sort_unstable();
            prop_assert!(s.min_duration <= s.p50);
            prop_assert!(s.p50 <= s.p90);
            prop_assert!(s.p90 <= s.p99);
            prop_assert!(s.p99 <= s.max_duration);
            prop_assert!(values.binary_search(&s.p90).is_ok());
            prop_assert!(s.avg_duration >= s.min_duration && s.avg_duration <= s.max_duration);
        }
    }
}
