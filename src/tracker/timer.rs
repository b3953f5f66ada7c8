//! Scoped operation timer.

use std::time::Instant;

use serde_json::Value;

use super::{LatencyTracker, Metadata};

/// Metadata note attached when a timer is dropped without being finished.
pub const ABANDONED: &str = "operation dropped before completion";

/// Measures one operation from creation until [`finish`](Self::finish),
/// [`fail`](Self::fail) or drop, and records exactly one observation.
///
/// Dropping an unfinished timer (early return, panic, cancelled future)
/// records the observation with `success = false`.
#[must_use = "an unused timer records a failed observation when dropped"]
pub struct OperationTimer<'a> {
    tracker: &'a LatencyTracker,
    operation: String,
    metadata: Option<Metadata>,
    started: Instant,
    recorded: bool,
}

impl<'a> OperationTimer<'a> {
    pub(crate) fn new(tracker: &'a LatencyTracker, operation: String, metadata: Option<Metadata>) -> Self {
        Self {
            tracker,
            operation,
            metadata,
            started: Instant::now(),
            recorded: false,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Record the observation and return its duration.
    pub fn finish(mut self, success: bool) -> u64 {
        self.record(success, None)
    }

    /// Record a failed observation carrying `error` in its metadata.
    pub fn fail(mut self, error: impl Into<String>) -> u64 {
        self.record(false, Some(error.into()))
    }

    fn record(&mut self, success: bool, error: Option<String>) -> u64 {
        let duration_ms = self.elapsed_ms();
        let mut metadata = self.metadata.take();
        if let Some(err) = error {
            metadata
                .get_or_insert_with(Metadata::new)
                .insert("error".to_string(), Value::String(err));
        }
        self.tracker
            .record_outcome(&self.operation, duration_ms, metadata, success);
        self.recorded = true;
        duration_ms
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        if !self.recorded {
            self.record(false, Some(ABANDONED.to_string()));
        }
    }
}
