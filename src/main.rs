//! Stabledash Gateway Server
//!
//! Run with: cargo run --bin stabledash
//!
//! # Configuration
//!
//! Loads `config.toml` from the usual locations (see [`Config::load_default`]),
//! then applies environment overrides:
//! - `STABLEDASH_HOST` / `STABLEDASH_PORT`: Listen address (default: 0.0.0.0:8080)
//! - `STABLEDASH_ENGINE_URL`: DSC engine backend URL (default: http://localhost:8000)
//! - `STABLEDASH_DATA_DIR`: Directory for persisted wallet sessions
//! - `DSC_ENGINE_ADDRESS` / `DSC_ADDRESS` / `WBTC_ADDRESS` / `WETH_ADDRESS`: Contract addresses
//! - `STABLEDASH_CHAIN_ID` / `STABLEDASH_RPC_URL` / `STABLEDASH_EXPLORER_URL`: Network settings
//! - `GEMINI_API_KEY`: Enables the AI assistant (no key, no assistant)
//! - `GEMINI_MODEL`: Gemini model name (default: gemini-1.5-flash)
//! - `RUST_LOG`: Log filter (default: from `[logging]` config)

use stabledash::api::{serve, AppState};
use stabledash::assistant::{system_prompt, ChatService, FunctionExecutor, GeminiClient, GeminiConfig};
use stabledash::config::Config;
use stabledash::engine::{EngineClient, EngineConfig};
use stabledash::ops::Operations;
use stabledash::wallet::{PortfolioService, SessionStore, TokenRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional, real env vars win
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load_default();

    // Initialize tracing
    init_tracing(&config);

    tracing::info!("Starting Stabledash gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Engine backend: {}", config.engine.base_url);
    tracing::info!("Chain id: {}", config.network.chain_id);

    // Engine client (all protocol logic lives behind it)
    let engine = Arc::new(EngineClient::new(EngineConfig {
        base_url: config.engine.base_url.clone(),
        timeout_secs: config.engine.timeout_secs,
        max_retries: config.engine.max_retries,
    }));

    // Check engine availability
    match engine.health_check().await {
        Ok(_) => tracing::info!("Engine connection verified"),
        Err(e) => tracing::warn!("Engine not available: {} (balances will read as zero)", e),
    }

    // Aggregation and operation layers
    let registry = TokenRegistry::new(&config.contracts);
    let portfolio = Arc::new(PortfolioService::new(Arc::clone(&engine), registry));
    let ops = Arc::new(Operations::new(
        Arc::clone(&engine),
        config.contracts.clone(),
        &config.network,
    ));

    // Wallet session registry
    tracing::info!("Session data directory: {}", config.session.data_dir);
    let sessions = Arc::new(SessionStore::open(Path::new(&config.session.data_dir)));

    // Create app state (with or without the AI assistant)
    let gateway = config.gateway.clone();
    let state = if config.assistant.enabled && !config.assistant.api_key.is_empty() {
        tracing::info!("AI assistant enabled: {}", config.assistant.model);

        let model = Arc::new(GeminiClient::new(GeminiConfig {
            api_key: config.assistant.api_key.clone(),
            model: config.assistant.model.clone(),
            base_url: config.assistant.base_url.clone(),
            timeout_secs: config.engine.timeout_secs,
        }));

        let executor = FunctionExecutor::new(Arc::clone(&ops), Arc::clone(&portfolio));
        let chat = Arc::new(ChatService::new(
            model,
            executor,
            system_prompt(&config.contracts),
        ));

        AppState::with_assistant(engine, portfolio, ops, sessions, config, chat)
    } else {
        tracing::info!("AI assistant disabled (set GEMINI_API_KEY to enable)");
        AppState::new(engine, portfolio, ops, sessions, config)
    };

    // Run server
    serve(state, &gateway).await?;

    tracing::info!("Stabledash gateway stopped");

    Ok(())
}

/// Initialize the tracing subscriber from the logging config
///
/// `RUST_LOG` beats the configured level; the `json` format is meant for
/// production log shipping.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "stabledash={},tower_http=debug",
            config.logging.level
        ))
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
