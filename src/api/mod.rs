//! Stabledash REST API
//!
//! HTTP gateway for the DSC dashboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Session
//! - `POST /api/session/connect` - Connect a wallet
//! - `POST /api/session/disconnect` - Disconnect a session
//! - `GET /api/session/:id` - Look up a session
//!
//! ## Account
//! - `GET /api/account/:session_id/overview` - Full dashboard overview
//! - `GET /api/account/:session_id/health-factor` - Health factor with status
//! - `GET /api/account/:session_id/balance/:token` - Single token position
//!
//! ## Tokens
//! - `GET /api/tokens` - Collateral token list
//! - `POST /api/tokens/approve` - Approve a spender
//! - `POST /api/tokens/faucet` - Mint test WBTC/WETH
//!
//! ## Collateral and DSC
//! - `POST /api/collateral/deposit` - Deposit collateral
//! - `POST /api/collateral/redeem` - Redeem collateral
//! - `POST /api/collateral/deposit-and-mint` - Deposit and mint in one tx
//! - `POST /api/collateral/redeem-for-dsc` - Redeem by burning DSC
//! - `POST /api/dsc/mint` - Mint DSC
//! - `POST /api/dsc/burn` - Burn DSC
//! - `POST /api/liquidate` - Liquidate a position
//!
//! ## Transfer
//! - `POST /api/transfer/simulate` - Demo transfer (no chain interaction)
//!
//! ## Chat (AI assistant)
//! - `POST /api/chat` - Send a message
//! - `GET /api/chat/:session_id/history` - Conversation thread
//!
//! ## Settings
//! - `GET /api/settings` - Current settings
//! - `PUT /api/settings/engine-url` - Override the engine base URL
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe (engine reachable)
//! - `GET /health` - Full health status
//! - `GET /` - Service info

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);

    let api_routes = Router::new()
        // Session routes
        .route("/session/connect", post(routes::session::connect))
        .route("/session/disconnect", post(routes::session::disconnect))
        .route("/session/:id", get(routes::session::get_session))
        // Account routes
        .route(
            "/account/:session_id/overview",
            get(routes::account::overview),
        )
        .route(
            "/account/:session_id/health-factor",
            get(routes::account::health_factor),
        )
        .route(
            "/account/:session_id/balance/:token",
            get(routes::account::token_balance),
        )
        // Token routes
        .route("/tokens", get(routes::tokens::list_tokens))
        .route("/tokens/approve", post(routes::operations::approve))
        .route("/tokens/faucet", post(routes::operations::faucet))
        // Collateral routes
        .route("/collateral/deposit", post(routes::operations::deposit))
        .route("/collateral/redeem", post(routes::operations::redeem))
        .route(
            "/collateral/deposit-and-mint",
            post(routes::operations::deposit_and_mint),
        )
        .route(
            "/collateral/redeem-for-dsc",
            post(routes::operations::redeem_for_dsc),
        )
        // DSC routes
        .route("/dsc/mint", post(routes::operations::mint))
        .route("/dsc/burn", post(routes::operations::burn))
        .route("/liquidate", post(routes::operations::liquidate))
        // Transfer routes
        .route("/transfer/simulate", post(routes::transfer::simulate))
        // Chat routes
        .route("/chat", post(routes::chat::send_message))
        .route("/chat/:session_id/history", get(routes::chat::history))
        // Settings routes
        .route("/settings", get(routes::settings::get_settings))
        .route("/settings/engine-url", put(routes::settings::set_engine_url));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::health::service_info))
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS from the configured origins; permissive when none are set
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if parsed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server
pub async fn serve(state: AppState, config: &GatewayConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Stabledash gateway listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Stabledash gateway shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::engine::{EngineClient, EngineConfig};
    use crate::ops::Operations;
    use crate::wallet::{PortfolioService, SessionStore, TokenRegistry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Json,
    };
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    const USER: &str = "0x1234567890abcdef1234567890abcdef12345678";
    const TOKEN: &str = "0x0000000000000000000000000000000000000e74";

    async fn spawn_stub_engine() -> String {
        let app = Router::new()
            .route(
                "/collateral-tokens",
                get(|| async { Json(json!({"collateral_tokens": [TOKEN]})) }),
            )
            .route(
                "/save-wallet",
                axum::routing::post(|| async { Json(json!({"message": "Wallet saved"})) }),
            )
            .route(
                "/account-information",
                axum::routing::post(|| async {
                    Json(json!({
                        "total_dsc_minted": "1000000000000000000",
                        "collateral_value_in_usd": "3000000000000000000"
                    }))
                }),
            )
            .route(
                "/health-factor",
                axum::routing::post(|| async {
                    Json(json!({"health_factor": "2000000000000000000"}))
                }),
            )
            .route(
                "/collateral-balance",
                axum::routing::post(|| async {
                    Json(json!({"balance": "1000000000000000000"}))
                }),
            )
            .route(
                "/usd-value",
                axum::routing::post(|| async {
                    Json(json!({"usd_value": "3000000000000000000"}))
                }),
            )
            .route(
                "/deposit-collateral",
                axum::routing::post(|| async { Json(json!({"tx_hash": "0xaa"})) }),
            )
            .route(
                "/mint-dsc",
                axum::routing::post(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "engine down"})),
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let engine_url = spawn_stub_engine().await;

        let config = Config::default();
        let engine = Arc::new(EngineClient::new(EngineConfig {
            base_url: engine_url,
            timeout_secs: 5,
            max_retries: 0,
        }));
        let registry = TokenRegistry::new(&config.contracts);
        let portfolio = Arc::new(PortfolioService::new(engine.clone(), registry));
        let ops = Arc::new(Operations::new(
            engine.clone(),
            config.contracts.clone(),
            &config.network,
        ));
        let sessions = Arc::new(SessionStore::open(dir.path()));

        let state = AppState::new(engine, portfolio, ops, sessions, config);
        (build_router(state), dir)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn connect(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/session/connect",
                json!({"address": USER, "chain_id": 31337}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        body["session"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_service_info() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["service"], "stabledash");
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(get_request("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(get_request("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["assistant"], "disabled");
    }

    #[tokio::test]
    async fn test_connect_then_overview() {
        let (app, _dir) = create_test_app().await;

        let session_id = connect(&app).await;

        let response = app
            .oneshot(get_request(&format!(
                "/api/account/{}/overview",
                session_id
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["address"], USER);
        assert_eq!(body["positions"].as_array().unwrap().len(), 1);
        assert_eq!(body["health"], "healthy");
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_address() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/session/connect",
                json!({"address": "not-an-address"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_connect_rejects_wrong_chain() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/session/connect",
                json!({"address": USER, "chain_id": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(get_request(&format!(
                "/api/session/{}",
                uuid::Uuid::new_v4()
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tokens_list() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(get_request("/api/tokens")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["tokens"][0]["address"], TOKEN);
    }

    #[tokio::test]
    async fn test_deposit_rejects_bad_amount() {
        let (app, _dir) = create_test_app().await;

        let session_id = connect(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/collateral/deposit",
                json!({"session_id": session_id, "token_address": TOKEN, "amount": "abc"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_deposit_succeeds() {
        let (app, _dir) = create_test_app().await;

        let session_id = connect(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/collateral/deposit",
                json!({"session_id": session_id, "token_address": TOKEN, "amount": "1.5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["summary"], "Successfully deposited 1.5 collateral");
        assert_eq!(body["tx_hash"], "0xaa");
    }

    #[tokio::test]
    async fn test_engine_failure_maps_to_bad_gateway() {
        let (app, _dir) = create_test_app().await;

        let session_id = connect(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/dsc/mint",
                json!({"session_id": session_id, "amount": "5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ENGINE_ERROR");
        assert_eq!(
            body["error"]["message"],
            "Failed to mint DSC. Please try again."
        );
    }

    #[tokio::test]
    async fn test_chat_disabled_returns_503() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(json_request("POST", "/api/chat", json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ASSISTANT_DISABLED");
    }

    #[tokio::test]
    async fn test_settings_engine_url_roundtrip() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/settings/engine-url",
                json!({"base_url": "ftp://wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/settings/engine-url",
                json!({"base_url": "http://localhost:9999/"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["engine_url"], "http://localhost:9999");

        let response = app.oneshot(get_request("/api/settings")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["engine_url"], "http://localhost:9999");
        assert_eq!(body["chain_id"], 31337);
    }

    #[tokio::test]
    async fn test_simulated_transfer() {
        let (app, _dir) = create_test_app().await;

        let session_id = connect(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/transfer/simulate",
                json!({"session_id": session_id, "to": TOKEN, "amount": "0.5", "memo": "rent"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["to"], TOKEN);
        assert_eq!(body["memo"], "rent");
        assert!(body["tx_hash"].as_str().unwrap().starts_with("0x"));
    }
}
