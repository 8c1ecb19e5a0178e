//! Account Aggregation
//!
//! Builds the dashboard view of a wallet: totals from the engine, the
//! health factor, and a per-token breakdown of deposited collateral.
//! Individual token lookups degrade to zero balances; only a failure of
//! the totals themselves degrades the whole overview, and even then the
//! caller gets a zeroed view with an error note rather than a failure.

use chrono::{DateTime, Utc};
use futures_util::future;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::engine::{EngineClient, EngineError};
use crate::units::from_wei;
use crate::wallet::tokens::{TokenInfo, TokenRegistry};

/// One collateral token position (amounts are wei strings)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralPosition {
    pub token: TokenInfo,
    pub balance: String,
    pub usd_value: String,
}

/// Position health classification, thresholds matching the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    Unknown,
}

impl HealthStatus {
    /// Classify a health factor wei string: below 1.0 is critical, below
    /// 1.5 is warning.
    pub fn classify(health_factor_wei: &str) -> Self {
        let value = match from_wei(health_factor_wei) {
            Ok(decimal) => match decimal.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return HealthStatus::Unknown,
            },
            Err(_) => return HealthStatus::Unknown,
        };

        if value < 1.0 {
            HealthStatus::Critical
        } else if value < 1.5 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// The aggregated dashboard view of one wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOverview {
    pub address: String,
    /// Total DSC minted (wei string)
    pub total_dsc_minted: String,
    /// Collateral value in USD as reported by the engine (wei string)
    pub collateral_value_usd: String,
    /// Sum of the per-position USD values below (wei string)
    pub positions_value_usd: String,
    /// Raw health factor (wei string)
    pub health_factor: String,
    pub health: HealthStatus,
    /// collateral USD / minted DSC, when any DSC is minted
    pub collateralization_ratio: Option<f64>,
    pub positions: Vec<CollateralPosition>,
    /// Set when the overview had to fall back to zeroed values
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl AccountOverview {
    /// Zeroed overview used when the engine cannot be asked
    fn degraded(address: &str, error: String) -> Self {
        Self {
            address: address.to_string(),
            total_dsc_minted: "0".to_string(),
            collateral_value_usd: "0".to_string(),
            positions_value_usd: "0".to_string(),
            health_factor: "0".to_string(),
            health: HealthStatus::Unknown,
            collateralization_ratio: None,
            positions: Vec::new(),
            error: Some(error),
            fetched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
enum PortfolioError {
    #[error("No collateral tokens found. Please check your backend configuration.")]
    NoTokens,

    #[error("Failed to fetch account information: {0}")]
    AccountInformation(EngineError),

    #[error("Failed to fetch health factor: {0}")]
    HealthFactor(EngineError),
}

/// Aggregates engine lookups into dashboard views
pub struct PortfolioService {
    engine: Arc<EngineClient>,
    registry: TokenRegistry,
}

impl PortfolioService {
    pub fn new(engine: Arc<EngineClient>, registry: TokenRegistry) -> Self {
        Self { engine, registry }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Collateral tokens with metadata
    ///
    /// Falls back to the configured WBTC/WETH pair when the engine cannot
    /// be reached. An engine that answers with an empty list is passed
    /// through; `overview` treats that as a configuration error.
    pub async fn collateral_tokens(&self) -> Vec<TokenInfo> {
        match self.engine.collateral_tokens().await {
            Ok(addresses) => addresses
                .iter()
                .map(|addr| self.registry.resolve(addr))
                .collect(),
            Err(e) => {
                tracing::warn!("Falling back to hardcoded collateral tokens: {}", e);
                self.registry.fallback_tokens()
            }
        }
    }

    /// Health factor and its classification for a wallet
    pub async fn health(&self, address: &str) -> Result<(String, HealthStatus), EngineError> {
        let health_factor = self.engine.health_factor(address).await?;
        let status = HealthStatus::classify(&health_factor);
        Ok((health_factor, status))
    }

    /// Balance and USD value of a single collateral token
    pub async fn token_balance(
        &self,
        address: &str,
        token: &str,
    ) -> Result<CollateralPosition, EngineError> {
        let balance = self.engine.collateral_balance(address, token).await?;
        let usd_value = self.engine.usd_value(address, token).await?;
        Ok(CollateralPosition {
            token: self.registry.resolve(token),
            balance,
            usd_value,
        })
    }

    /// Full dashboard overview for a wallet
    ///
    /// Never fails: totals that cannot be fetched produce a zeroed
    /// overview carrying the error message.
    pub async fn overview(&self, address: &str) -> AccountOverview {
        match self.build_overview(address).await {
            Ok(overview) => overview,
            Err(e) => {
                tracing::error!("Account overview for {} degraded: {}", address, e);
                AccountOverview::degraded(address, e.to_string())
            }
        }
    }

    async fn build_overview(&self, address: &str) -> Result<AccountOverview, PortfolioError> {
        let tokens = self.collateral_tokens().await;
        if tokens.is_empty() {
            return Err(PortfolioError::NoTokens);
        }

        let info = self
            .engine
            .account_information(address)
            .await
            .map_err(PortfolioError::AccountInformation)?;

        let health_factor = self
            .engine
            .health_factor(address)
            .await
            .map_err(PortfolioError::HealthFactor)?;

        let lookups = tokens.into_iter().map(|token| {
            let engine = self.engine.clone();
            let user = address.to_string();
            async move {
                let fetched: Result<(String, String), EngineError> = async {
                    let balance = engine.collateral_balance(&user, &token.address).await?;
                    let usd_value = engine.usd_value(&user, &token.address).await?;
                    Ok((balance, usd_value))
                }
                .await;

                match fetched {
                    Ok((balance, usd_value)) => CollateralPosition {
                        token,
                        balance,
                        usd_value,
                    },
                    Err(e) => {
                        tracing::warn!(
                            "Balance lookup for token {} failed, reporting zero: {}",
                            token.symbol,
                            e
                        );
                        CollateralPosition {
                            token,
                            balance: "0".to_string(),
                            usd_value: "0".to_string(),
                        }
                    }
                }
            }
        });
        let positions = future::join_all(lookups).await;

        let health = HealthStatus::classify(&health_factor);
        let collateralization_ratio =
            collateralization_ratio(&info.collateral_value_in_usd, &info.total_dsc_minted);

        Ok(AccountOverview {
            address: address.to_string(),
            total_dsc_minted: info.total_dsc_minted,
            collateral_value_usd: info.collateral_value_in_usd,
            positions_value_usd: sum_usd(&positions),
            health_factor,
            health,
            collateralization_ratio,
            positions,
            error: None,
            fetched_at: Utc::now(),
        })
    }
}

/// Sum position USD values (wei strings); unparseable entries count as zero
fn sum_usd(positions: &[CollateralPosition]) -> String {
    positions
        .iter()
        .map(|p| p.usd_value.parse::<u128>().unwrap_or(0))
        .fold(0u128, u128::saturating_add)
        .to_string()
}

fn collateralization_ratio(collateral_usd_wei: &str, minted_wei: &str) -> Option<f64> {
    let collateral = from_wei(collateral_usd_wei).ok()?.parse::<f64>().ok()?;
    let minted = from_wei(minted_wei).ok()?.parse::<f64>().ok()?;
    if minted > 0.0 {
        Some(collateral / minted)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractsConfig;
    use crate::engine::EngineConfig;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    const WBTC: &str = "0x0000000000000000000000000000000000000b7c";
    const WETH: &str = "0x0000000000000000000000000000000000000e74";
    const USER: &str = "0x1234567890abcdef1234567890abcdef12345678";

    fn test_registry() -> TokenRegistry {
        TokenRegistry::new(&ContractsConfig {
            dsc_engine: "0x00000000000000000000000000000000000000e1".to_string(),
            dsc: "0x00000000000000000000000000000000000000d5".to_string(),
            wbtc: WBTC.to_string(),
            weth: WETH.to_string(),
        })
    }

    fn service_at(base_url: String) -> PortfolioService {
        let engine = Arc::new(EngineClient::new(EngineConfig {
            base_url,
            timeout_secs: 5,
            max_retries: 0,
        }));
        PortfolioService::new(engine, test_registry())
    }

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn happy_engine() -> Router {
        Router::new()
            .route(
                "/collateral-tokens",
                get(|| async { Json(serde_json::json!({"collateral_tokens": [WBTC, WETH]})) }),
            )
            .route(
                "/account-information",
                post(|| async {
                    Json(serde_json::json!({
                        "total_dsc_minted": "2000000000000000000",
                        "collateral_value_in_usd": "6000000000000000000"
                    }))
                }),
            )
            .route(
                "/health-factor",
                post(|| async { Json(serde_json::json!({"health_factor": "1600000000000000000"})) }),
            )
            .route(
                "/collateral-balance",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let balance = if body["token"] == WBTC {
                        "100000000000000000"
                    } else {
                        "2000000000000000000"
                    };
                    Json(serde_json::json!({"balance": balance}))
                }),
            )
            .route(
                "/usd-value",
                post(|Json(body): Json<serde_json::Value>| async move {
                    let usd = if body["token"] == WBTC {
                        "4000000000000000000"
                    } else {
                        "2000000000000000000"
                    };
                    Json(serde_json::json!({"usd_value": usd}))
                }),
            )
    }

    #[test]
    fn test_health_classification() {
        assert_eq!(
            HealthStatus::classify("500000000000000000"),
            HealthStatus::Critical
        );
        assert_eq!(
            HealthStatus::classify("1200000000000000000"),
            HealthStatus::Warning
        );
        assert_eq!(
            HealthStatus::classify("1500000000000000000"),
            HealthStatus::Healthy
        );
        assert_eq!(
            HealthStatus::classify("99000000000000000000"),
            HealthStatus::Healthy
        );
        assert_eq!(HealthStatus::classify("0"), HealthStatus::Critical);
        assert_eq!(HealthStatus::classify("not-a-number"), HealthStatus::Unknown);
    }

    #[tokio::test]
    async fn test_overview_happy_path() {
        let base = spawn_stub(happy_engine()).await;
        let service = service_at(base);

        let overview = service.overview(USER).await;
        assert!(overview.error.is_none());
        assert_eq!(overview.total_dsc_minted, "2000000000000000000");
        assert_eq!(overview.collateral_value_usd, "6000000000000000000");
        assert_eq!(overview.positions_value_usd, "6000000000000000000");
        assert_eq!(overview.health, HealthStatus::Healthy);
        assert_eq!(overview.positions.len(), 2);
        assert_eq!(overview.positions[0].token.symbol, "WBTC");
        assert_eq!(overview.positions[0].balance, "100000000000000000");
        assert_eq!(overview.positions[1].token.symbol, "WETH");
        // 6 USD collateral / 2 DSC minted
        assert_eq!(overview.collateralization_ratio, Some(3.0));
    }

    #[tokio::test]
    async fn test_failed_token_lookup_degrades_to_zero() {
        let app = Router::new()
            .route(
                "/collateral-tokens",
                get(|| async { Json(serde_json::json!({"collateral_tokens": [WBTC, WETH]})) }),
            )
            .route(
                "/account-information",
                post(|| async {
                    Json(serde_json::json!({
                        "total_dsc_minted": "2000000000000000000",
                        "collateral_value_in_usd": "6000000000000000000"
                    }))
                }),
            )
            .route(
                "/health-factor",
                post(|| async { Json(serde_json::json!({"health_factor": "1600000000000000000"})) }),
            )
            .route(
                "/collateral-balance",
                post(|| async { Json(serde_json::json!({"balance": "100000000000000000"})) }),
            )
            .route(
                "/usd-value",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["token"] == WETH {
                        (
                            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                            Json(serde_json::json!({"error": "price feed stale"})),
                        )
                    } else {
                        (
                            axum::http::StatusCode::OK,
                            Json(serde_json::json!({"usd_value": "4000000000000000000"})),
                        )
                    }
                }),
            );
        let base = spawn_stub(app).await;
        let service = service_at(base);

        let overview = service.overview(USER).await;
        assert!(overview.error.is_none());
        assert_eq!(overview.positions.len(), 2);
        assert_eq!(overview.positions[0].usd_value, "4000000000000000000");
        assert_eq!(overview.positions[1].balance, "0");
        assert_eq!(overview.positions[1].usd_value, "0");
    }

    #[tokio::test]
    async fn test_totals_failure_yields_degraded_overview() {
        let app = Router::new()
            .route(
                "/collateral-tokens",
                get(|| async { Json(serde_json::json!({"collateral_tokens": [WBTC]})) }),
            )
            .route(
                "/account-information",
                post(|| async {
                    (
                        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({"error": "engine wallet locked"})),
                    )
                }),
            );
        let base = spawn_stub(app).await;
        let service = service_at(base);

        let overview = service.overview(USER).await;
        let error = overview.error.unwrap();
        assert!(error.contains("Failed to fetch account information"));
        assert_eq!(overview.total_dsc_minted, "0");
        assert_eq!(overview.health, HealthStatus::Unknown);
        assert!(overview.positions.is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_list_is_configuration_error() {
        let app = Router::new().route(
            "/collateral-tokens",
            get(|| async { Json(serde_json::json!({"collateral_tokens": []})) }),
        );
        let base = spawn_stub(app).await;
        let service = service_at(base);

        let overview = service.overview(USER).await;
        assert!(overview
            .error
            .unwrap()
            .contains("No collateral tokens found"));
    }

    #[tokio::test]
    async fn test_tokens_fall_back_when_engine_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = service_at(format!("http://{}", addr));
        let tokens = service.collateral_tokens().await;
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "WBTC");
        assert_eq!(tokens[1].symbol, "WETH");
    }

    #[test]
    fn test_sum_usd_skips_unparseable() {
        let registry = test_registry();
        let positions = vec![
            CollateralPosition {
                token: registry.resolve(WBTC),
                balance: "1".to_string(),
                usd_value: "100".to_string(),
            },
            CollateralPosition {
                token: registry.resolve(WETH),
                balance: "1".to_string(),
                usd_value: "garbage".to_string(),
            },
        ];
        assert_eq!(sum_usd(&positions), "100");
    }
}
