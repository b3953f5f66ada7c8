use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "tutor-cache")]
#[command(version)]
#[command(about = "Canned-answer cache and latency tracker for a children's tutoring chatbot")]
pub struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Classify one message and print the cached answer, if any
    Classify {
        /// Student message
        message: String,
    },

    /// Run the HTTP front door
    Serve {
        /// Bind host (defaults to the config value)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (defaults to the config value)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer each message offline, then print the metrics report as JSON
    Report {
        /// Student messages to replay
        messages: Vec<String>,
    },
}

/// Pick the log filter: the CLI flag overrides the config file.
pub fn resolve_log_level(flag: Option<&str>, server: &ServerConfig) -> String {
    flag.map(str::to_string)
        .unwrap_or_else(|| server.log_level.clone())
}

/// `host:port` for the listener, with CLI overrides applied.
pub fn bind_address(host: Option<&str>, port: Option<u16>, server: &ServerConfig) -> String {
    format!(
        "{}:{}",
        host.unwrap_or(&server.host),
        port.unwrap_or(server.port)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_log_level_prefers_flag() {
        let server = ServerConfig::default();
        assert_eq!(resolve_log_level(Some("debug"), &server), "debug");
        assert_eq!(resolve_log_level(None, &server), "info");
    }

    #[test]
    fn test_bind_address_defaults_and_overrides() {
        let server = ServerConfig::default();
        assert_eq!(bind_address(None, None, &server), "127.0.0.1:8787");
        assert_eq!(bind_address(Some("0.0.0.0"), Some(9000), &server), "0.0.0.0:9000");
    }

    #[test]
    fn test_parse_classify() {
        let args = Args::try_parse_from(["tutor-cache", "classify", "2+2"]).unwrap();
        assert_eq!(args.command, Command::Classify { message: "2+2".into() });
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let args = Args::try_parse_from([
            "tutor-cache",
            "serve",
            "--port",
            "9001",
            "--config",
            "tutor.toml",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Serve { host: None, port: Some(9001) });
        assert_eq!(args.config, Some(PathBuf::from("tutor.toml")));
        assert_eq!(args.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_parse_report_messages() {
        let args = Args::try_parse_from(["tutor-cache", "report", "hola", "5*5"]).unwrap();
        assert_eq!(
            args.command,
            Command::Report { messages: vec!["hola".into(), "5*5".into()] }
        );
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["tutor-cache"]).is_err());
    }
}
