//! DSC Engine REST API Client
//!
//! HTTP client for the DSC engine backend. Amounts cross the wire as wei
//! strings in both directions. The backend reports failures as
//! `{"error": "..."}` bodies with a 4xx/5xx status.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// DSC engine REST API client
pub struct EngineClient {
    client: Client,
    /// Swappable at runtime through the settings endpoint.
    base_url: RwLock<String>,
    config: EngineConfig,
}

/// Configuration for the engine client
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL for the engine API (e.g., "http://localhost:8000")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retry attempts for read calls
    pub max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Totals for a wallet, as reported by `/account-information`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInformation {
    /// Total DSC minted by the wallet (wei string)
    pub total_dsc_minted: String,
    /// USD value of all deposited collateral (wei string)
    pub collateral_value_in_usd: String,
}

/// Result of an `/approve-tokens` call
///
/// The engine skips the transaction when the current allowance already
/// covers the requested amount and answers with a message instead of a
/// hash.
#[derive(Debug, Clone, PartialEq)]
pub enum ApproveOutcome {
    Submitted { tx_hash: String },
    AlreadySufficient { message: String },
}

impl EngineClient {
    /// Create a new engine client with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: RwLock::new(config.base_url.clone()),
            config,
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current engine base URL
    pub async fn base_url(&self) -> String {
        self.base_url.read().await.clone()
    }

    /// Repoint the client at a different engine instance
    pub async fn set_base_url(&self, url: String) {
        let mut base = self.base_url.write().await;
        *base = url.trim_end_matches('/').to_string();
    }

    async fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.read().await.trim_end_matches('/'), path)
    }

    /// Check if the engine backend is reachable
    pub async fn health_check(&self) -> Result<(), EngineError> {
        let url = self.url("/collateral-tokens").await;

        let response = self.client.get(&url).send().await.map_err(map_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(EngineError::Unavailable)
        }
    }

    /// Register a connected wallet with the engine
    pub async fn save_wallet(&self, user: &str) -> Result<String, EngineError> {
        let body = UserBody { user };
        let resp: MessageResponse = self.send_tx("/save-wallet", &body).await?;
        Ok(resp.message)
    }

    /// Minted-DSC and collateral-value totals for a wallet
    pub async fn account_information(
        &self,
        user: &str,
    ) -> Result<AccountInformation, EngineError> {
        let body = UserBody { user };
        self.send_read("/account-information", &body).await
    }

    /// Addresses of the collateral tokens the protocol accepts
    pub async fn collateral_tokens(&self) -> Result<Vec<String>, EngineError> {
        let url = self.url("/collateral-tokens").await;
        let mut last_error = EngineError::Unavailable;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = std::time::Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            match self.client.get(&url).send().await {
                Ok(response) => {
                    let resp: TokensResponse = decode_response(response).await?;
                    return Ok(resp.collateral_tokens);
                }
                Err(e) => {
                    last_error = map_transport(e);
                    continue;
                }
            }
        }

        Err(last_error)
    }

    /// Wallet's deposited balance of one collateral token (wei string)
    pub async fn collateral_balance(
        &self,
        user: &str,
        token: &str,
    ) -> Result<String, EngineError> {
        // Balance lookups use the field name `token`, not `token_address`.
        let body = UserTokenBody { user, token };
        let resp: BalanceResponse = self.send_read("/collateral-balance", &body).await?;
        Ok(resp.balance)
    }

    /// USD value of the wallet's deposited balance of one token (wei string)
    pub async fn usd_value(&self, user: &str, token: &str) -> Result<String, EngineError> {
        let body = UserTokenBody { user, token };
        let resp: UsdValueResponse = self.send_read("/usd-value", &body).await?;
        Ok(resp.usd_value)
    }

    /// Wallet health factor (wei string; below 1.0 is liquidatable)
    pub async fn health_factor(&self, user: &str) -> Result<String, EngineError> {
        let body = UserBody { user };
        let resp: HealthFactorResponse = self.send_read("/health-factor", &body).await?;
        Ok(resp.health_factor)
    }

    /// Deposit collateral. Returns the transaction hash.
    pub async fn deposit_collateral(
        &self,
        user: &str,
        token_address: &str,
        amount_wei: &str,
    ) -> Result<String, EngineError> {
        let body = TokenAmountBody {
            user,
            token_address,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/deposit-collateral", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Mint DSC against deposited collateral. Returns the transaction hash.
    pub async fn mint_dsc(&self, user: &str, amount_wei: &str) -> Result<String, EngineError> {
        let body = AmountBody {
            user,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/mint-dsc", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Deposit collateral and mint DSC in a single transaction
    pub async fn deposit_collateral_and_mint_dsc(
        &self,
        user: &str,
        token_address: &str,
        amount_wei: &str,
        mint_wei: &str,
    ) -> Result<String, EngineError> {
        let body = DepositAndMintBody {
            user,
            token_address,
            amount: amount_wei,
            amount_dsc_to_mint: mint_wei,
        };
        let resp: TxHashResponse = self
            .send_tx("/deposit-collateral-and-mint-dsc", &body)
            .await?;
        Ok(resp.tx_hash)
    }

    /// Burn DSC to reduce debt. Returns the transaction hash.
    pub async fn burn_dsc(&self, user: &str, amount_wei: &str) -> Result<String, EngineError> {
        let body = AmountBody {
            user,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/burn-dsc", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Withdraw deposited collateral. Returns the transaction hash.
    pub async fn redeem_collateral(
        &self,
        user: &str,
        token_address: &str,
        amount_wei: &str,
    ) -> Result<String, EngineError> {
        let body = TokenAmountBody {
            user,
            token_address,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/redeem-collateral", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Burn DSC and withdraw collateral in a single transaction
    pub async fn redeem_collateral_for_dsc(
        &self,
        user: &str,
        token_address: &str,
        amount_wei: &str,
        burn_wei: &str,
    ) -> Result<String, EngineError> {
        let body = RedeemForDscBody {
            user,
            token_address,
            amount: amount_wei,
            amount_dsc_to_burn: burn_wei,
        };
        let resp: TxHashResponse = self.send_tx("/redeem-collateral-for-dsc", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Liquidate an undercollateralized position
    pub async fn liquidate(
        &self,
        user: &str,
        collateral: &str,
        debt_to_cover_wei: &str,
    ) -> Result<String, EngineError> {
        let body = LiquidateBody {
            user,
            collateral,
            debt_to_cover: debt_to_cover_wei,
        };
        let resp: TxHashResponse = self.send_tx("/liquidate", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Approve a spender for a token amount
    pub async fn approve_tokens(
        &self,
        user: &str,
        token_address: &str,
        spender_address: &str,
        amount_wei: &str,
    ) -> Result<ApproveOutcome, EngineError> {
        let body = ApproveBody {
            user,
            token_address,
            spender_address,
            amount: amount_wei,
        };
        let resp: ApproveResponse = self.send_tx("/approve-tokens", &body).await?;

        if let Some(tx_hash) = resp.tx_hash {
            Ok(ApproveOutcome::Submitted { tx_hash })
        } else if let Some(message) = resp.message {
            Ok(ApproveOutcome::AlreadySufficient { message })
        } else {
            Err(EngineError::Decode(
                "approve response carried neither tx_hash nor message".to_string(),
            ))
        }
    }

    /// Mint test WBTC from the faucet. Returns the transaction hash.
    pub async fn mint_wbtc(&self, user: &str, amount_wei: &str) -> Result<String, EngineError> {
        let body = AmountBody {
            user,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/mint-wbtc", &body).await?;
        Ok(resp.tx_hash)
    }

    /// Mint test WETH from the faucet. Returns the transaction hash.
    pub async fn mint_weth(&self, user: &str, amount_wei: &str) -> Result<String, EngineError> {
        let body = AmountBody {
            user,
            amount: amount_wei,
        };
        let resp: TxHashResponse = self.send_tx("/mint-weth", &body).await?;
        Ok(resp.tx_hash)
    }

    /// POST a read query with retry logic
    async fn send_read<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let url = self.url(path).await;
        let mut last_error = EngineError::Unavailable;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 4s, 9s...
                let delay = std::time::Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            match self.client.post(&url).json(body).send().await {
                Ok(response) => return decode_response(response).await,
                Err(e) => {
                    last_error = map_transport(e);
                    continue;
                }
            }
        }

        Err(last_error)
    }

    /// POST a state-changing call
    ///
    /// Transactions are never replayed on timeout: a request that may have
    /// reached the engine could already be on chain. Only connection
    /// failures, where the request was never sent, are retried.
    async fn send_tx<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let url = self.url(path).await;
        let mut last_error = EngineError::Unavailable;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = std::time::Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            match self.client.post(&url).json(body).send().await {
                Ok(response) => return decode_response(response).await,
                Err(e) if e.is_connect() => {
                    last_error = EngineError::Unavailable;
                    continue;
                }
                Err(e) => return Err(map_transport(e)),
            }
        }

        Err(last_error)
    }
}

fn map_transport(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() {
        EngineError::Unavailable
    } else {
        EngineError::Request(e)
    }
}

/// Decode a response body, mapping the engine's error envelope
async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, EngineError> {
    let status = response.status();

    if status.is_success() {
        let text = response.text().await.map_err(EngineError::Request)?;
        serde_json::from_str(&text).map_err(|e| EngineError::Decode(e.to_string()))
    } else {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);
        Err(EngineError::Engine {
            status: status.as_u16(),
            message,
        })
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct UserBody<'a> {
    user: &'a str,
}

#[derive(Debug, Serialize)]
struct UserTokenBody<'a> {
    user: &'a str,
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct AmountBody<'a> {
    user: &'a str,
    amount: &'a str,
}

#[derive(Debug, Serialize)]
struct TokenAmountBody<'a> {
    user: &'a str,
    token_address: &'a str,
    amount: &'a str,
}

#[derive(Debug, Serialize)]
struct DepositAndMintBody<'a> {
    user: &'a str,
    token_address: &'a str,
    amount: &'a str,
    amount_dsc_to_mint: &'a str,
}

#[derive(Debug, Serialize)]
struct RedeemForDscBody<'a> {
    user: &'a str,
    token_address: &'a str,
    amount: &'a str,
    amount_dsc_to_burn: &'a str,
}

#[derive(Debug, Serialize)]
struct LiquidateBody<'a> {
    user: &'a str,
    collateral: &'a str,
    debt_to_cover: &'a str,
}

#[derive(Debug, Serialize)]
struct ApproveBody<'a> {
    user: &'a str,
    token_address: &'a str,
    spender_address: &'a str,
    amount: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TxHashResponse {
    tx_hash: String,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    #[serde(default)]
    collateral_tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    balance: String,
}

#[derive(Debug, Deserialize)]
struct UsdValueResponse {
    usd_value: String,
}

#[derive(Debug, Deserialize)]
struct HealthFactorResponse {
    health_factor: String,
}

#[derive(Debug, Deserialize)]
struct ApproveResponse {
    tx_hash: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when communicating with the engine backend
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine backend unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Engine error {status}: {message}")]
    Engine { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to decode engine response: {0}")]
    Decode(String),
}
