//! Settings Routes
//!
//! Runtime configuration view, including the engine base URL override
//! that lets an operator repoint the backend without a restart.
//!
//! - GET /api/settings - Current settings
//! - PUT /api/settings/engine-url - Override the engine base URL

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{EngineUrlRequest, SettingsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(settings_view(&state).await)
}

/// PUT /api/settings/engine-url
pub async fn set_engine_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EngineUrlRequest>,
) -> ApiResult<Json<SettingsResponse>> {
    let url = req.base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::Validation(
            "Engine URL must start with http:// or https://".to_string(),
        ));
    }

    state.engine.set_base_url(url.to_string()).await;
    tracing::info!(engine_url = %url, "Engine base URL updated");

    Ok(Json(settings_view(&state).await))
}

async fn settings_view(state: &AppState) -> SettingsResponse {
    let config = &state.config;
    SettingsResponse {
        engine_url: state.engine.base_url().await,
        chain_id: config.network.chain_id,
        rpc_url: config.network.rpc_url.clone(),
        explorer_url: config.network.explorer_url.clone(),
        dsc_address: config.contracts.dsc.clone(),
        dsc_engine_address: config.contracts.dsc_engine.clone(),
        wbtc_address: config.contracts.wbtc.clone(),
        weth_address: config.contracts.weth.clone(),
        assistant_enabled: state.has_assistant(),
    }
}
