//! Ilmquest application binary - composition root.
//!
//! 1. Parse CLI flags (optionally write a default config and exit)
//! 2. Initialize tracing and load configuration from TOML
//! 3. Build the generation client and chat pipeline
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;
use ilmquest_api::{start_server, AppState};
use ilmquest_chat::{ChatCompletionsClient, ChatService};
use ilmquest_core::IlmquestConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();

    if args.init_config {
        IlmquestConfig::default().save(&config_file)?;
        println!("Wrote default configuration to {}", config_file.display());
        return Ok(());
    }

    // Tracing comes up before the config is read so load warnings are visible.
    // The file's log level is swapped in once the config is known.
    let (filter, filter_handle) =
        reload::Layer::new(EnvFilter::new(args.resolve_log_filter("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = IlmquestConfig::load_or_default(&config_file);
    let level = args.resolve_log_filter(&config.general.log_level);
    match EnvFilter::try_new(&level) {
        Ok(f) => {
            if let Err(e) = filter_handle.reload(f) {
                tracing::warn!(error = %e, "Could not apply configured log level");
            }
        }
        Err(e) => tracing::warn!(level = %level, error = %e, "Invalid log level, keeping info"),
    }

    tracing::info!("Starting Ilmquest v{}", env!("CARGO_PKG_VERSION"));

    // CLI overrides.
    config.server.port = args.resolve_port(config.server.port);
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref model) = args.model {
        config.generation.model = model.clone();
    }

    // Chat pipeline.
    let generator = ChatCompletionsClient::new(&config.generation, &config.response.fallback_answer)?;
    tracing::info!(
        endpoint = %generator.endpoint(),
        model = %config.generation.model,
        max_tokens = config.generation.max_tokens,
        window = config.history.window_size,
        "Generation client ready"
    );
    let chat = ChatService::from_config(&config, Arc::new(generator));

    // API server.
    let state = AppState::new(config, chat);
    if let Err(e) = start_server(state).await {
        tracing::error!(error = %e, "API server stopped");
        return Err(e.into());
    }

    Ok(())
}
