//! Canned-answer cache and latency tracking for a children's tutoring chatbot.
//!
//! [`Classifier`] answers greetings, simple arithmetic and a handful of
//! school topics without calling a language model. [`LatencyTracker`] and
//! [`ResponseTimeTracker`] keep bounded in-memory histories of how long each
//! step took. [`ChatResponder`] ties the two together around a pluggable
//! [`Generator`](responder::Generator).

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod responder;
pub mod server;
pub mod tracker;

pub use classifier::{CacheHit, Classifier, MatchKind};
pub use config::TutorConfig;
pub use error::{Result, TutorError};
pub use report::MetricsReport;
pub use responder::{ChatRequest, ChatResponder, Reply};
pub use tracker::{LatencyTracker, MetricsSummary, OperationMetric, OperationTimer, ResponseTimeTracker};
