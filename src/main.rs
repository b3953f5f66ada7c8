use std::sync::Arc;

use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use tutor_cache::cli::{bind_address, resolve_log_level, Args, Command};
use tutor_cache::report::{MetricsReport, DEFAULT_SLOW_LIMIT};
use tutor_cache::responder::{ChatRequest, ChatResponder, OfflineGenerator};
use tutor_cache::{server, Classifier, LatencyTracker, ResponseTimeTracker, TutorConfig};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_responder(config: &TutorConfig) -> ChatResponder<OfflineGenerator> {
    ChatResponder::new(
        OfflineGenerator,
        Arc::new(Classifier::default()),
        Arc::new(LatencyTracker::new(config.tracker.clone())),
        Arc::new(ResponseTimeTracker::new(config.response_times.clone())),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = TutorConfig::load_or_default(args.config.as_deref())?;
    init_tracing(&resolve_log_level(args.log_level.as_deref(), &config.server));

    match args.command {
        Command::Classify { message } => {
            let classifier = Classifier::default();
            match classifier.classify_detailed(&message) {
                Some(hit) => {
                    println!("{} {} ({})", "HIT".green().bold(), hit.rule.cyan(), hit.kind);
                    println!("{}", hit.response);
                }
                None => println!("{} send to the model", "MISS".yellow().bold()),
            }
        }
        Command::Serve { host, port } => {
            let addr = bind_address(host.as_deref(), port, &config.server);
            let responder = Arc::new(build_responder(&config));
            server::serve(&addr, responder).await?;
        }
        Command::Report { messages } => {
            let responder = build_responder(&config);
            for (i, message) in messages.iter().enumerate() {
                let request = ChatRequest::new(format!("cli-{i}"), message.as_str());
                if let Err(e) = responder.respond(&request).await {
                    eprintln!("{} {}: {}", "MISS".yellow().bold(), message, e);
                }
            }
            let report = MetricsReport::collect(responder.tracker(), responder.response_times(), DEFAULT_SLOW_LIMIT);
            println!("{}", report.to_json_pretty()?);
        }
    }

    Ok(())
}
