//! Conversation-level reply latency, split by cached vs. model-generated.
//!
//! A narrower sibling of [`LatencyTracker`](super::LatencyTracker): one ring
//! of the most recent replies, used to report what the cache saves.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{lock, now_ms};
use crate::config::ResponseTimeConfig;

/// One reply sent to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetric {
    pub timestamp_ms: u64,
    pub duration_ms: u64,
    pub cached: bool,
    pub conversation_id: String,
}

/// Rounded mean reply times in milliseconds; 0 when a partition is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseTimeAverages {
    pub average: u64,
    pub cached: u64,
    pub uncached: u64,
}

pub struct ResponseTimeTracker {
    config: ResponseTimeConfig,
    samples: Mutex<VecDeque<ResponseMetric>>,
}

impl Default for ResponseTimeTracker {
    fn default() -> Self {
        Self::new(ResponseTimeConfig::default())
    }
}

fn rounded_mean<'a>(durations: impl Iterator<Item = &'a ResponseMetric>) -> u64 {
    let (sum, n) = durations.fold((0u128, 0u64), |(s, n), m| (s + u128::from(m.duration_ms), n + 1));
    if n == 0 {
        0
    } else {
        (sum as f64 / n as f64).round() as u64
    }
}

impl ResponseTimeTracker {
    pub fn new(mut config: ResponseTimeConfig) -> Self {
        config.capacity = config.capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(config.capacity)),
            config,
        }
    }

    /// Record a reply that started at `started_at_ms` (Unix epoch) and ends now.
    pub fn track_response_time(&self, conversation_id: &str, started_at_ms: u64, was_cached: bool) {
        let duration_ms = now_ms().saturating_sub(started_at_ms);
        self.record_response(conversation_id, duration_ms, was_cached);
    }

    /// Record a reply with a precomputed duration.
    pub fn record_response(&self, conversation_id: &str, duration_ms: u64, was_cached: bool) {
        {
            let mut samples = lock(&self.samples);
            samples.push_back(ResponseMetric {
                timestamp_ms: now_ms(),
                duration_ms,
                cached: was_cached,
                conversation_id: conversation_id.to_string(),
            });
            while samples.len() > self.config.capacity {
                samples.pop_front();
            }
        }

        if !was_cached && duration_ms > self.config.slow_response_ms {
            warn!(conversation_id, duration_ms, "Slow response");
        }
    }

    pub fn average_response_time(&self) -> ResponseTimeAverages {
        let samples = lock(&self.samples);
        ResponseTimeAverages {
            average: rounded_mean(samples.iter()),
            cached: rounded_mean(samples.iter().filter(|m| m.cached)),
            uncached: rounded_mean(samples.iter().filter(|m| !m.cached)),
        }
    }

    /// Retained replies, oldest first.
    pub fn recent(&self) -> Vec<ResponseMetric> {
        lock(&self.samples).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.samples).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        lock(&self.samples).clear();
    }
}
