//! Operation Routes
//!
//! Protocol operations for a connected wallet. Every handler resolves
//! the session, hands the validated inputs to the operation layer, and
//! returns the outcome summary with the explorer link. Validation
//! failures map to 400, engine failures to 502 with a generic summary.
//!
//! - POST /api/collateral/deposit
//! - POST /api/collateral/redeem
//! - POST /api/collateral/deposit-and-mint
//! - POST /api/collateral/redeem-for-dsc
//! - POST /api/dsc/mint
//! - POST /api/dsc/burn
//! - POST /api/tokens/approve
//! - POST /api/tokens/faucet
//! - POST /api/liquidate

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{
    ApproveRequest, CollateralRequest, DepositAndMintRequest, DscAmountRequest, FaucetRequest,
    LiquidateRequest, RedeemForDscRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::session::require_session;
use crate::api::state::AppState;
use crate::ops::{FaucetToken, OpOutcome};

/// POST /api/collateral/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CollateralRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .deposit_collateral(&session.address, &req.token_address, &req.amount)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/collateral/redeem
pub async fn redeem(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CollateralRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .redeem_collateral(&session.address, &req.token_address, &req.amount)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/collateral/deposit-and-mint
pub async fn deposit_and_mint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DepositAndMintRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .deposit_and_mint(
            &session.address,
            &req.token_address,
            &req.deposit_amount,
            &req.mint_amount,
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /api/collateral/redeem-for-dsc
pub async fn redeem_for_dsc(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedeemForDscRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .redeem_for_dsc(
            &session.address,
            &req.token_address,
            &req.redeem_amount,
            &req.burn_amount,
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /api/dsc/mint
pub async fn mint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DscAmountRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state.ops.mint_dsc(&session.address, &req.amount).await?;
    Ok(Json(outcome))
}

/// POST /api/dsc/burn
pub async fn burn(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DscAmountRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state.ops.burn_dsc(&session.address, &req.amount).await?;
    Ok(Json(outcome))
}

/// POST /api/tokens/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApproveRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .approve(
            &session.address,
            &req.token_address,
            req.spender_address.as_deref(),
            &req.amount,
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /api/tokens/faucet
pub async fn faucet(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FaucetRequest>,
) -> ApiResult<Json<OpOutcome>> {
    let session = require_session(&state, &req.session_id).await?;

    let token = FaucetToken::parse(&req.token).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unknown faucet token: {}. Use wbtc or weth",
            req.token
        ))
    })?;

    let outcome = state
        .ops
        .faucet(&session.address, token, &req.amount)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/liquidate
///
/// Liquidates another user's undercollateralized position on behalf of
/// the connected wallet.
pub async fn liquidate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LiquidateRequest>,
) -> ApiResult<Json<OpOutcome>> {
    require_session(&state, &req.session_id).await?;
    let outcome = state
        .ops
        .liquidate(&req.user, &req.collateral_address, &req.debt_to_cover)
        .await?;
    Ok(Json(outcome))
}
