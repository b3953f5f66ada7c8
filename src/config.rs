//! # Module: config
//!
//! TOML configuration for the trackers and the HTTP front door. Every
//! section is optional; missing keys fall back to [`Default`].
//!
//! ```toml
//! [tracker]
//! capacity = 1000
//! default_slow_threshold_ms = 1000
//!
//! [tracker.slow_thresholds_ms]
//! "api.chat" = 3000
//!
//! [response_times]
//! capacity = 100
//! slow_response_ms = 2000
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8787
//! log_level = "info"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

/// Per-operation history bound for the general tracker.
pub const DEFAULT_TRACKER_CAPACITY: usize = 1_000;
/// Threshold for operation names missing from the threshold table.
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 1_000;
/// History bound for the conversation response-time tracker.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 100;
/// Uncached replies slower than this are logged.
pub const DEFAULT_SLOW_RESPONSE_MS: u64 = 2_000;

/// Built-in slow thresholds, in milliseconds.
pub fn default_slow_thresholds() -> HashMap<String, u64> {
    [
        ("api.chat", 3_000),
        ("api.chat-stream", 2_000),
        ("zep.session.create", 1_000),
        ("zep.session.get", 500),
        ("zep.memory.add", 500),
        ("zep.memory.get", 500),
        ("db.message.insert", 200),
        ("db.conversation.fetch", 300),
        ("gemini.generate", 2_000),
        ("cache.check", 10),
    ]
    .into_iter()
    .map(|(name, ms)| (name.to_string(), ms))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub capacity: usize,
    pub default_slow_threshold_ms: u64,
    /// Entries here are merged over [`default_slow_thresholds`].
    pub slow_thresholds_ms: HashMap<String, u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRACKER_CAPACITY,
            default_slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            slow_thresholds_ms: default_slow_thresholds(),
        }
    }
}

impl TrackerConfig {
    /// Slow threshold for `operation`, falling back to the default.
    pub fn threshold_for(&self, operation: &str) -> u64 {
        self.slow_thresholds_ms
            .get(operation)
            .copied()
            .unwrap_or(self.default_slow_threshold_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseTimeConfig {
    pub capacity: usize,
    pub slow_response_ms: u64,
}

impl Default for ResponseTimeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RESPONSE_CAPACITY,
            slow_response_ms: DEFAULT_SLOW_RESPONSE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            log_level: "info".to_string(),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub tracker: TrackerConfig,
    pub response_times: ResponseTimeConfig,
    pub server: ServerConfig,
}

impl TutorConfig {
    /// Parse a TOML document. User thresholds are layered over the built-in table.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut cfg: TutorConfig = toml::from_str(raw)?;
        let mut thresholds = default_slow_thresholds();
        thresholds.extend(std::mem::take(&mut cfg.tracker.slow_thresholds_ms));
        cfg.tracker.slow_thresholds_ms = thresholds;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Load `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracker.capacity == 0 {
            return Err(TutorError::InvalidConfig(
                "tracker.capacity must be > 0".into(),
            ));
        }
        if self.response_times.capacity == 0 {
            return Err(TutorError::InvalidConfig(
                "response_times.capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_builtin_table() {
        let cfg = TutorConfig::default();
        assert_eq!(cfg.tracker.capacity, 1_000);
        assert_eq!(cfg.response_times.capacity, 100);
        assert_eq!(cfg.tracker.threshold_for("cache.check"), 10);
        assert_eq!(cfg.tracker.threshold_for("api.chat"), 3_000);
    }

    #[test]
    fn test_unknown_operation_uses_default_threshold() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.threshold_for("something.else"), DEFAULT_SLOW_THRESHOLD_MS);
    }

    #[test]
    fn test_empty_document_is_default() {
        let cfg = TutorConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, TutorConfig::default());
    }

    #[test]
    fn test_partial_thresholds_merge_over_builtin() {
        let raw = r#"
[tracker]
default_slow_threshold_ms = 750

[tracker.slow_thresholds_ms]
"api.chat" = 4000
"custom.op" = 25
"#;
        let cfg = TutorConfig::from_toml_str(raw).unwrap();
        assert_eq!(cfg.tracker.threshold_for("api.chat"), 4_000);
        assert_eq!(cfg.tracker.threshold_for("custom.op"), 25);
        assert_eq!(cfg.tracker.threshold_for("db.message.insert"), 200);
        assert_eq!(cfg.tracker.threshold_for("unlisted"), 750);
        assert_eq!(cfg.tracker.capacity, DEFAULT_TRACKER_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = TutorConfig::from_toml_str("[tracker]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, TutorError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = TutorConfig::from_toml_str("[tracker\n").unwrap_err();
        assert!(matches!(err, TutorError::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9100\n[response_times]\ncapacity = 5").unwrap();
        let cfg = TutorConfig::load(file.path()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.response_times.capacity, 5);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = TutorConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, TutorError::Io(_)));
    }

    #[test]
    fn test_load_or_default_none() {
        let cfg = TutorConfig::load_or_default(None).unwrap();
        assert_eq!(cfg, TutorConfig::default());
    }
}
