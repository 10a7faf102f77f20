//! Legal Aid terminal client - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Install tracing
//! 3. Build the HTTP backend and probe its health
//! 4. Run the command loop over stdin until /quit or EOF

mod cli;
mod command;
mod render;
mod repl;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use legalaid_chat::ChatOrchestrator;
use legalaid_client::{HttpBackend, LegalBackend};
use legalaid_core::LegalAidConfig;
use legalaid_speech::UnsupportedHost;

use crate::cli::CliArgs;
use crate::repl::{Repl, Step};

/// Check the backend once at startup. Failure is not fatal: queries will
/// fall back to the apology answer until it comes up.
async fn probe_backend(backend: &dyn LegalBackend) {
    match backend.health().await {
        Ok(status) if status.is_healthy() => {
            tracing::info!(rules_loaded = status.rules_loaded, "Backend healthy");
        }
        Ok(status) => {
            tracing::warn!(status = %status.status, "Backend reports unhealthy status");
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Backend unreachable, answers will be unavailable until it starts"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = LegalAidConfig::load_or_default(&config_file);
    config.backend.base_url = args.resolve_backend_url(&config.backend.base_url);

    // Tracing. Logs go to stderr so they don't interleave with answers.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Legal Aid v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Backend.
    let backend = Arc::new(HttpBackend::from_config(&config.backend)?);
    tracing::info!(url = %backend.base_url(), "Using backend");
    probe_backend(backend.as_ref()).await;

    // A terminal has no speech engines.
    let host = Arc::new(UnsupportedHost);
    let chat = Arc::new(ChatOrchestrator::new(
        backend.clone(),
        host.clone(),
        host,
        &config,
    ));
    let repl = Repl::new(chat, backend);

    println!("Legal Aid Assistant: housing, employment and consumer law guidance.");
    println!("Type your question, or /topics to browse examples and /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let step = match command::parse(&line) {
            Ok(command) => repl.execute(command).await,
            Err(e) => Step::Continue(e.to_string()),
        };
        match step {
            Step::Continue(text) if text.is_empty() => {}
            Step::Continue(text) => println!("{text}"),
            Step::Quit => break,
        }
    }

    tracing::info!("Legal Aid client exiting");
    Ok(())
}
