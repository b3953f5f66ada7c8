//! # Stage: Latency Tracker
//!
//! ## Responsibility
//! Time named operations, keep a bounded history per operation name, and
//! report rolling statistics plus the observations that crossed their
//! operation's slow-threshold.
//!
//! ## Guarantees
//! - Thread-safe: buckets live behind one `Mutex`; append + evict happen
//!   under a single acquisition, so no update is lost or evicted twice
//! - Bounded: each bucket holds at most `capacity` observations (FIFO)
//! - Never fails on its own account; wrapped failures are recorded and then
//!   handed back to the caller untouched
//! - Every exit path is measured, including panics and cancelled futures
//!
//! ## NOT Responsible For
//! - Timeouts or cancellation of the wrapped work
//! - Persistence (in-memory only)
//! - Serving the numbers (see [`crate::report`])

pub mod response_time;
pub mod summary;
pub mod timer;

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::TrackerConfig;

pub use response_time::{ResponseMetric, ResponseTimeAverages, ResponseTimeTracker};
pub use summary::{percentile, MetricsSummary};
pub use timer::OperationTimer;

/// Opaque caller-supplied key/value data stored alongside an observation.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Current Unix-epoch time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Lock `m`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One observation of a named operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetric {
    pub operation: String,
    pub duration_ms: u64,
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub success: bool,
    /// Tracker-wide insertion order, used to break timestamp ties.
    #[serde(skip)]
    sequence: u64,
}

/// Per-operation latency store.
///
/// Construct one per process (or per test) and share it behind an `Arc`.
pub struct LatencyTracker {
    config: TrackerConfig,
    buckets: Mutex<HashMap<String, VecDeque<OperationMetric>>>,
    next_sequence: AtomicU64,
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl LatencyTracker {
    /// A `capacity` of zero is raised to one.
    pub fn new(mut config: TrackerConfig) -> Self {
        config.capacity = config.capacity.max(1);
        Self {
            config,
            buckets: Mutex::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    /// Default thresholds with a custom per-operation bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(TrackerConfig { capacity, ..TrackerConfig::default() })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn threshold_for(&self, operation: &str) -> u64 {
        self.config.threshold_for(operation)
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Record a successful observation.
    pub fn record(&self, operation: &str, duration_ms: u64, metadata: Option<Metadata>) {
        self.record_outcome(operation, duration_ms, metadata, true);
    }

    /// Record an observation with an explicit outcome.
    ///
    /// Creates the bucket on first use and evicts the oldest entry once the
    /// bucket exceeds its capacity. Logs a warning when `duration_ms` is
    /// above the operation's slow-threshold.
    pub fn record_outcome(
        &self,
        operation: &str,
        duration_ms: u64,
        metadata: Option<Metadata>,
        success: bool,
    ) {
        let threshold = self.threshold_for(operation);
        let slow_metadata = (duration_ms > threshold).then(|| metadata.clone());

        {
            let mut buckets = lock(&self.buckets);
            // Stamped under the lock so sequence order is insertion order.
            let metric = OperationMetric {
                operation: operation.to_string(),
                duration_ms,
                timestamp_ms: now_ms(),
                metadata,
                success,
                sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            };
            let bucket = buckets.entry(operation.to_string()).or_default();
            bucket.push_back(metric);
            while bucket.len() > self.config.capacity {
                bucket.pop_front();
            }
        }

        if let Some(metadata) = slow_metadata {
            warn!(
                operation,
                duration_ms,
                threshold_ms = threshold,
                success,
                metadata = ?metadata,
                "Slow operation detected"
            );
        }
    }

    /// Start a scoped timer for `operation`.
    pub fn start(&self, operation: &str) -> OperationTimer<'_> {
        OperationTimer::new(self, operation.to_string(), None)
    }

    /// Start a scoped timer carrying `metadata`.
    pub fn start_with(&self, operation: &str, metadata: Option<Metadata>) -> OperationTimer<'_> {
        OperationTimer::new(self, operation.to_string(), metadata)
    }

    /// Await `work`, record its duration and outcome, and return its result
    /// unchanged. On `Err` the error's `Display` text is stored under
    /// `metadata["error"]`.
    pub async fn wrap<F, T, E>(&self, operation: &str, metadata: Option<Metadata>, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let timer = self.start_with(operation, metadata);
        let result = work.await;
        match &result {
            Ok(_) => {
                timer.finish(true);
            }
            Err(e) => {
                timer.fail(e.to_string());
            }
        }
        result
    }

    /// Synchronous counterpart of [`LatencyTracker::wrap`].
    pub fn wrap_sync<F, T, E>(&self, operation: &str, metadata: Option<Metadata>, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::fmt::Display,
    {
        let timer = self.start_with(operation, metadata);
        let result = work();
        match &result {
            Ok(_) => {
                timer.finish(true);
            }
            Err(e) => {
                timer.fail(e.to_string());
            }
        }
        result
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Statistics for one operation; `None` when nothing is recorded.
    pub fn summarize(&self, operation: &str) -> Option<MetricsSummary> {
        let durations: Vec<u64> = {
            let buckets = lock(&self.buckets);
            buckets.get(operation)?.iter().map(|m| m.duration_ms).collect()
        };
        MetricsSummary::from_durations(operation, &durations)
    }

    /// One summary per non-empty bucket, slowest average first.
    pub fn summarize_all(&self) -> Vec<MetricsSummary> {
        let snapshot: Vec<(String, Vec<u64>)> = {
            let buckets = lock(&self.buckets);
            buckets
                .iter()
                .map(|(name, bucket)| (name.clone(), bucket.iter().map(|m| m.duration_ms).collect()))
                .collect()
        };

        let mut summaries: Vec<MetricsSummary> = snapshot
            .into_iter()
            .filter_map(|(name, durations)| MetricsSummary::from_durations(name, &durations))
            .collect();
        summaries.sort_by(|a, b| {
            b.avg_duration
                .cmp(&a.avg_duration)
                .then_with(|| a.operation.cmp(&b.operation))
        });
        summaries
    }

    /// Observations above their operation's threshold, most recent first.
    pub fn slow_operations(&self, limit: usize) -> Vec<OperationMetric> {
        let mut slow: Vec<OperationMetric> = {
            let buckets = lock(&self.buckets);
            buckets
                .values()
                .flatten()
                .filter(|m| m.duration_ms > self.threshold_for(&m.operation))
                .cloned()
                .collect()
        };
        slow.sort_by(|a, b| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        slow.truncate(limit);
        slow
    }

    /// Observations for `operation` in insertion order.
    pub fn history(&self, operation: &str) -> Vec<OperationMetric> {
        lock(&self.buckets)
            .get(operation)
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of every operation with a bucket, sorted.
    pub fn operations(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.buckets).keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop one bucket, or every bucket when `operation` is `None`.
    pub fn clear(&self, operation: Option<&str>) {
        let mut buckets = lock(&self.buckets);
        match operation {
            Some(name) => {
                buckets.remove(name);
            }
            None => buckets.clear(),
        }
    }
}
