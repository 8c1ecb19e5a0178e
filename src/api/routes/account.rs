//! Account Routes
//!
//! Read endpoints for a connected wallet's positions.
//!
//! - GET /api/account/:session_id/overview - Full dashboard overview
//! - GET /api/account/:session_id/health-factor - Health factor with status
//! - GET /api/account/:session_id/balance/:token - Single token position

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::HealthFactorDto;
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::session::require_session;
use crate::api::state::AppState;
use crate::units::is_address;
use crate::wallet::{AccountOverview, CollateralPosition};

/// GET /api/account/:session_id/overview
///
/// Aggregated balances, health factor, and per-token positions. Never
/// fails: engine trouble degrades to a zeroed overview with an error
/// note, the way the dashboard expects.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<AccountOverview>> {
    let session = require_session(&state, &session_id).await?;
    let overview = state.portfolio.overview(&session.address).await;
    Ok(Json(overview))
}

/// GET /api/account/:session_id/health-factor
pub async fn health_factor(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<HealthFactorDto>> {
    let session = require_session(&state, &session_id).await?;

    let (health_factor, status) = state
        .portfolio
        .health(&session.address)
        .await
        .map_err(|e| ApiError::Engine(format!("Failed to fetch health factor: {}", e)))?;

    Ok(Json(HealthFactorDto {
        address: session.address,
        health_factor,
        status,
    }))
}

/// GET /api/account/:session_id/balance/:token
pub async fn token_balance(
    State(state): State<Arc<AppState>>,
    Path((session_id, token)): Path<(Uuid, String)>,
) -> ApiResult<Json<CollateralPosition>> {
    let session = require_session(&state, &session_id).await?;

    if !is_address(&token) {
        return Err(ApiError::Validation(format!(
            "Invalid token address: {}",
            token
        )));
    }

    let position = state
        .portfolio
        .token_balance(&session.address, &token)
        .await
        .map_err(|e| ApiError::Engine(format!("Failed to fetch balance: {}", e)))?;

    Ok(Json(position))
}
