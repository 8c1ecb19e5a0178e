//! Transfer Routes
//!
//! - POST /api/transfer/simulate - Demo transfer without touching the chain

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::TransferRequest;
use crate::api::error::ApiResult;
use crate::api::routes::session::require_session;
use crate::api::state::AppState;
use crate::ops::SimulatedTransfer;

/// POST /api/transfer/simulate
///
/// Validates the recipient and amount, then fabricates a transaction
/// hash. Nothing reaches the engine or the chain.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<Json<SimulatedTransfer>> {
    require_session(&state, &req.session_id).await?;

    let transfer = state.ops.simulate_transfer(&req.to, &req.amount, req.memo)?;

    tracing::info!(tx_hash = %transfer.tx_hash, "Simulated transfer");
    Ok(Json(transfer))
}
