//! # Stabledash
//!
//! DSC Dashboard Gateway - A full-stack Rust service layer between a wallet
//! dashboard and the DSC (Decentralized Stablecoin) engine backend.
//!
//! ## Features
//!
//! - **Wallet sessions**: Connect an address once, operate through a session id
//! - **Portfolio aggregation**: Collateral positions, minted DSC, and health factor in one call
//! - **Protocol operations**: Deposit, redeem, mint, burn, approve, and liquidate via the engine
//! - **AI assistant**: Gemini-backed chat that can execute wallet operations
//! - **Resilient by default**: Engine failures degrade to zero balances, never to a dead dashboard
//!
//! ## Modules
//!
//! - [`engine`]: Typed HTTP client for the DSC engine backend
//! - [`wallet`]: Session registry and portfolio aggregation
//! - [`ops`]: Validated protocol operations
//! - [`assistant`]: Gemini chat with function calling
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stabledash::config::Config;
//! use stabledash::engine::{EngineClient, EngineConfig};
//! use stabledash::ops::Operations;
//! use stabledash::wallet::{PortfolioService, SessionStore, TokenRegistry};
//! use stabledash::api::{serve, AppState};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     // Client for the engine backend that holds all protocol logic
//!     let engine = Arc::new(EngineClient::new(EngineConfig {
//!         base_url: config.engine.base_url.clone(),
//!         timeout_secs: config.engine.timeout_secs,
//!         max_retries: config.engine.max_retries,
//!     }));
//!
//!     // Aggregation and operation layers
//!     let registry = TokenRegistry::new(&config.contracts);
//!     let portfolio = Arc::new(PortfolioService::new(Arc::clone(&engine), registry));
//!     let ops = Arc::new(Operations::new(
//!         Arc::clone(&engine),
//!         config.contracts.clone(),
//!         &config.network,
//!     ));
//!     let sessions = Arc::new(SessionStore::open(Path::new(&config.session.data_dir)));
//!
//!     // Serve the dashboard API
//!     let gateway = config.gateway.clone();
//!     let state = AppState::new(engine, portfolio, ops, sessions, config);
//!     serve(state, &gateway).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod config;
pub mod engine;
pub mod ops;
pub mod units;
pub mod wallet;

// Re-export top-level types for convenience
pub use engine::{AccountInformation, ApproveOutcome, EngineClient, EngineConfig, EngineError};

pub use wallet::{
    AccountOverview, CollateralPosition, HealthStatus, PortfolioService, SessionStore, TokenInfo,
    TokenRegistry, WalletSession,
};

pub use ops::{FaucetToken, OpError, OpOutcome, Operations, SimulatedTransfer};

pub use assistant::{
    ChatModel, ChatReply, ChatRole, ChatService, ChatTurn, FunctionCall, FunctionExecutor,
    FunctionResult, GeminiClient, GeminiConfig,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{
    AssistantConfig, Config, ConfigError, ContractsConfig, GatewayConfig, LoggingConfig,
    NetworkConfig, SessionConfig,
};

pub use units::{format_address, from_wei, is_address, to_wei, UnitsError};
