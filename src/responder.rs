//! # Stage: Chat Responder
//!
//! ## Responsibility
//! Answer one chat turn: try the [`Classifier`] first and only call the
//! language model on a miss. Every step is timed into the shared
//! [`LatencyTracker`] and every reply lands in the [`ResponseTimeTracker`].
//!
//! ## Guarantees
//! - A cache hit never touches the [`Generator`]
//! - Generator errors come back to the caller unchanged (same type, same value)
//! - `api.chat`, `cache.check` and `gemini.generate` are recorded on every path
//!
//! ## NOT Responsible For
//! - Talking to a real model, memory service or database (see [`Generator`])
//! - Persisting the conversation

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::classifier::{CacheHit, Classifier, MatchKind};
use crate::tracker::{now_ms, LatencyTracker, ResponseTimeTracker};

/// Whole chat turn.
pub const OP_CHAT: &str = "api.chat";
/// Classifier lookup.
pub const OP_CACHE_CHECK: &str = "cache.check";
/// Model call on a cache miss.
pub const OP_GENERATE: &str = "gemini.generate";

/// One inbound student message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
}

impl ChatRequest {
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
        }
    }
}

/// The answer sent back to the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub response: String,
    pub cached: bool,
    /// Matching path for cached replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MatchKind>,
}

/// The external model seam. Implementations own their transport, prompt
/// template and memory lookups.
pub trait Generator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn generate(&self, request: &ChatRequest) -> impl Future<Output = Result<String, Self::Error>> + Send;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("no language model configured")]
    Unavailable,

    #[error("model request failed: {0}")]
    Upstream(String),
}

/// Generator used when no model is wired in: every miss is `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerator;

impl Generator for OfflineGenerator {
    type Error = GeneratorError;

    fn generate(&self, _request: &ChatRequest) -> impl Future<Output = Result<String, Self::Error>> + Send {
        async { Err(GeneratorError::Unavailable) }
    }
}

pub struct ChatResponder<G> {
    classifier: Arc<Classifier>,
    tracker: Arc<LatencyTracker>,
    response_times: Arc<ResponseTimeTracker>,
    generator: G,
}

impl<G: Generator> ChatResponder<G> {
    pub fn new(
        generator: G,
        classifier: Arc<Classifier>,
        tracker: Arc<LatencyTracker>,
        response_times: Arc<ResponseTimeTracker>,
    ) -> Self {
        Self {
            classifier,
            tracker,
            response_times,
            generator,
        }
    }

    /// Responder with the built-in rules and default-sized trackers.
    pub fn with_defaults(generator: G) -> Self {
        Self::new(
            generator,
            Arc::new(Classifier::default()),
            Arc::new(LatencyTracker::default()),
            Arc::new(ResponseTimeTracker::default()),
        )
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn tracker(&self) -> &Arc<LatencyTracker> {
        &self.tracker
    }

    pub fn response_times(&self) -> &Arc<ResponseTimeTracker> {
        &self.response_times
    }

    /// Classify `message` under the `cache.check` timer.
    pub fn check_cache(&self, message: &str) -> Option<CacheHit> {
        let timer = self.tracker.start(OP_CACHE_CHECK);
        let hit = self.classifier.classify_detailed(message);
        timer.finish(true);
        hit
    }

    /// Answer one turn from the cache or the generator.
    pub async fn respond(&self, request: &ChatRequest) -> Result<Reply, G::Error> {
        let started_at = now_ms();
        let turn = self.tracker.start(OP_CHAT);

        if let Some(hit) = self.check_cache(&request.message) {
            self.response_times
                .track_response_time(&request.conversation_id, started_at, true);
            let elapsed = turn.finish(true);
            info!(
                conversation_id = %request.conversation_id,
                rule = %hit.rule,
                kind = %hit.kind,
                elapsed_ms = elapsed,
                "Served cached response"
            );
            return Ok(Reply {
                response: hit.response,
                cached: true,
                kind: Some(hit.kind),
            });
        }

        let generated = self
            .tracker
            .wrap(OP_GENERATE, None, self.generator.generate(request))
            .await;

        match generated {
            Ok(text) => {
                self.response_times
                    .track_response_time(&request.conversation_id, started_at, false);
                turn.finish(true);
                Ok(Reply {
                    response: text,
                    cached: false,
                    kind: None,
                })
            }
            Err(e) => {
                turn.fail(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the message back and counts calls.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    impl Generator for Echo {
        type Error = GeneratorError;

        fn generate(&self, request: &ChatRequest) -> impl Future<Output = Result<String, Self::Error>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = format!("modelo: {}", request.message);
            async move { Ok(text) }
        }
    }

    struct Failing;

    impl Generator for Failing {
        type Error = GeneratorError;

        fn generate(&self, _request: &ChatRequest) -> impl Future<Output = Result<String, Self::Error>> + Send {
            async { Err(GeneratorError::Upstream("quota exceeded".into())) }
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_generator() {
        let r = ChatResponder::with_defaults(Echo::default());
        let reply = r.respond(&ChatRequest::new("c1", "Hola")).await.unwrap();
        assert!(reply.cached);
        assert_eq!(reply.kind, Some(MatchKind::Phrase));
        assert_eq!(r.generator.calls.load(Ordering::SeqCst), 0);

        assert_eq!(r.tracker().summarize(OP_CACHE_CHECK).unwrap().count, 1);
        assert_eq!(r.tracker().summarize(OP_CHAT).unwrap().count, 1);
        assert!(r.tracker().summarize(OP_GENERATE).is_none());
        assert!(r.response_times().recent()[0].cached);
    }

    #[tokio::test]
    async fn test_miss_calls_generator_and_tracks_uncached() {
        let r = ChatResponder::with_defaults(Echo::default());
        let reply = r
            .respond(&ChatRequest::new("c1", "Cuéntame una historia de dragones"))
            .await
            .unwrap();
        assert!(!reply.cached);
        assert_eq!(reply.response, "modelo: Cuéntame una historia de dragones");
        assert_eq!(r.generator.calls.load(Ordering::SeqCst), 1);
        assert!(r.tracker().history(OP_GENERATE)[0].success);
        assert!(!r.response_times().recent()[0].cached);
    }

    #[tokio::test]
    async fn test_generator_error_is_returned_unchanged() {
        let r = ChatResponder::with_defaults(Failing);
        let err = r
            .respond(&ChatRequest::new("c1", "Cuéntame una historia"))
            .await
            .unwrap_err();
        assert_eq!(err, GeneratorError::Upstream("quota exceeded".into()));

        let gen = &r.tracker().history(OP_GENERATE)[0];
        assert!(!gen.success);
        assert_eq!(
            gen.metadata.as_ref().unwrap()["error"],
            serde_json::json!("model request failed: quota exceeded")
        );
        assert!(!r.tracker().history(OP_CHAT)[0].success);
        assert!(r.response_times().is_empty());
    }

    #[tokio::test]
    async fn test_offline_generator_reports_unavailable() {
        let r = ChatResponder::with_defaults(OfflineGenerator);
        let err = r.respond(&ChatRequest::new("c", "Escribe un poema")).await.unwrap_err();
        assert_eq!(err, GeneratorError::Unavailable);
        // Cached paths still work offline.
        assert!(r.respond(&ChatRequest::new("c", "2+2")).await.unwrap().cached);
    }

    #[test]
    fn test_chat_request_deserializes_camel_case() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"conversationId":"abc","message":"hola"}"#).unwrap();
        assert_eq!(req, ChatRequest::new("abc", "hola"));
    }
}
