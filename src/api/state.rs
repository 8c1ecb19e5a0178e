//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::assistant::ChatService;
use crate::config::Config;
use crate::engine::EngineClient;
use crate::ops::Operations;
use crate::wallet::{PortfolioService, SessionStore};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Client for the DSC engine backend
    pub engine: Arc<EngineClient>,
    /// Balance and health aggregation
    pub portfolio: Arc<PortfolioService>,
    /// Validated protocol operations
    pub ops: Arc<Operations>,
    /// Wallet session registry
    pub sessions: Arc<SessionStore>,
    /// AI assistant (optional, needs a configured model key)
    pub chat: Option<Arc<ChatService>>,
    /// Full service configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state without the AI assistant
    pub fn new(
        engine: Arc<EngineClient>,
        portfolio: Arc<PortfolioService>,
        ops: Arc<Operations>,
        sessions: Arc<SessionStore>,
        config: Config,
    ) -> Self {
        Self {
            engine,
            portfolio,
            ops,
            sessions,
            chat: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create state with the AI assistant wired in
    pub fn with_assistant(
        engine: Arc<EngineClient>,
        portfolio: Arc<PortfolioService>,
        ops: Arc<Operations>,
        sessions: Arc<SessionStore>,
        config: Config,
        chat: Arc<ChatService>,
    ) -> Self {
        Self {
            engine,
            portfolio,
            ops,
            sessions,
            chat: Some(chat),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if the AI assistant is available
    pub fn has_assistant(&self) -> bool {
        self.chat.is_some()
    }
}
