//! Metrics report served by `GET /api/metrics` and printed by `tutor-cache report`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::tracker::{LatencyTracker, MetricsSummary, OperationMetric, ResponseTimeTracker};

/// Slow observations included in a report by default.
pub const DEFAULT_SLOW_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMetrics {
    pub average_response_time: u64,
    pub cached_response_time: u64,
    pub uncached_response_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub timestamp: DateTime<Utc>,
    pub operation_summaries: Vec<MetricsSummary>,
    pub slow_operations: Vec<OperationMetric>,
    pub chat_metrics: ChatMetrics,
}

impl MetricsReport {
    /// Snapshot both trackers.
    pub fn collect(tracker: &LatencyTracker, response_times: &ResponseTimeTracker, slow_limit: usize) -> Self {
        let averages = response_times.average_response_time();
        Self {
            timestamp: Utc::now(),
            operation_summaries: tracker.summarize_all(),
            slow_operations: tracker.slow_operations(slow_limit),
            chat_metrics: ChatMetrics {
                average_response_time: averages.average,
                cached_response_time: averages.cached,
                uncached_response_time: averages.uncached,
            },
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_shape() {
        let report = MetricsReport::collect(&LatencyTracker::default(), &ResponseTimeTracker::default(), 10);
        let json = report.to_json().unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["operationSummaries"], serde_json::json!([]));
        assert_eq!(json["slowOperations"], serde_json::json!([]));
        assert_eq!(json["chatMetrics"]["averageResponseTime"], 0);
    }

    #[test]
    fn test_report_carries_summaries_and_slow_ops() {
        let tracker = LatencyTracker::default();
        tracker.record("cache.check", 2, None);
        tracker.record("cache.check", 40, None);
        tracker.record("api.chat", 900, None);
        let times = ResponseTimeTracker::default();
        times.record_response("c", 40, true);
        times.record_response("c", 900, false);

        let report = MetricsReport::collect(&tracker, &times, 1);
        assert_eq!(report.operation_summaries[0].operation, "api.chat");
        assert_eq!(report.slow_operations.len(), 1);
        assert_eq!(report.slow_operations[0].duration_ms, 40);
        assert_eq!(report.chat_metrics.cached_response_time, 40);
        assert_eq!(report.chat_metrics.uncached_response_time, 900);
        assert_eq!(report.chat_metrics.average_response_time, 470);

        let pretty = report.to_json_pretty().unwrap();
        assert!(pretty.contains("\"operationSummaries\""));
    }
}
