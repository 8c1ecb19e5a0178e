//! Token Routes
//!
//! - GET /api/tokens - Collateral token list with metadata

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::TokenListResponse;
use crate::api::state::AppState;

/// GET /api/tokens
///
/// Collateral tokens accepted by the engine, resolved to symbol and
/// name. Falls back to the configured WBTC/WETH pair when the engine is
/// unreachable, so the dashboard always has something to render.
pub async fn list_tokens(State(state): State<Arc<AppState>>) -> Json<TokenListResponse> {
    let tokens = state.portfolio.collateral_tokens().await;

    Json(TokenListResponse {
        total: tokens.len(),
        tokens,
    })
}
