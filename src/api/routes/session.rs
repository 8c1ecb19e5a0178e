//! Session Routes
//!
//! Wallet connect and disconnect. Connecting validates the address and
//! chain, registers the wallet with the engine, and returns the session
//! together with the first account overview so the dashboard renders in
//! one round trip.
//!
//! - POST /api/session/connect - Connect a wallet
//! - POST /api/session/disconnect - Disconnect a session
//! - GET /api/session/:id - Look up a session

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{ConnectRequest, ConnectResponse, DisconnectRequest, DisconnectResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::units::{format_address, is_address};
use crate::wallet::WalletSession;

/// POST /api/session/connect
pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectRequest>,
) -> ApiResult<(StatusCode, Json<ConnectResponse>)> {
    if !is_address(&req.address) {
        return Err(ApiError::Validation(format!(
            "Invalid wallet address: {}",
            req.address
        )));
    }

    let expected = state.config.network.chain_id;
    let chain_id = req.chain_id.unwrap_or(expected);
    if chain_id != expected {
        return Err(ApiError::Validation(format!(
            "Wrong network: expected chain id {}, got {}",
            expected, chain_id
        )));
    }

    // Registration with the engine is best-effort; the dashboard works
    // without it.
    if let Err(e) = state.engine.save_wallet(&req.address).await {
        tracing::warn!(
            "Failed to register wallet {}: {}",
            format_address(&req.address),
            e
        );
    }

    let session = state.sessions.connect(req.address.clone(), chain_id).await;
    let overview = state.portfolio.overview(&req.address).await;

    tracing::info!(
        session_id = %session.id,
        address = %format_address(&req.address),
        "Wallet connected"
    );

    Ok((StatusCode::CREATED, Json(ConnectResponse { session, overview })))
}

/// POST /api/session/disconnect
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DisconnectRequest>,
) -> ApiResult<Json<DisconnectResponse>> {
    let session = state
        .sessions
        .disconnect(&req.session_id)
        .await
        .ok_or_else(|| session_not_found(&req.session_id))?;

    if let Some(chat) = &state.chat {
        chat.clear(&req.session_id).await;
    }

    tracing::info!(
        session_id = %req.session_id,
        address = %format_address(&session.address),
        "Wallet disconnected"
    );

    Ok(Json(DisconnectResponse {
        status: "disconnected".to_string(),
        address: session.address,
    }))
}

/// GET /api/session/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WalletSession>> {
    let session = require_session(&state, &id).await?;
    Ok(Json(session))
}

/// Resolve a session id or fail with 404
pub(crate) async fn require_session(state: &AppState, id: &Uuid) -> ApiResult<WalletSession> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: &Uuid) -> ApiError {
    ApiError::NotFound(format!("Session {} not found", id))
}
