//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON. Domain types
//! that already carry their wire shape (account overviews, operation
//! outcomes, chat turns) are returned directly and not duplicated here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assistant::{FunctionCall, FunctionResult};
use crate::wallet::{AccountOverview, HealthStatus, TokenInfo, WalletSession};

// ============================================
// SESSION DTOs
// ============================================

/// Wallet connect request
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Wallet address (0x + 40 hex chars)
    pub address: String,
    /// Chain the wallet is on; must match the configured network
    #[serde(default)]
    pub chain_id: Option<u64>,
}

/// Wallet connect response
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// The created session
    pub session: WalletSession,
    /// First dashboard overview for the connected wallet
    pub overview: AccountOverview,
}

/// Wallet disconnect request
#[derive(Debug, Deserialize)]
pub struct DisconnectRequest {
    pub session_id: Uuid,
}

/// Wallet disconnect response
#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    /// Status: "disconnected"
    pub status: String,
    /// Address that was connected
    pub address: String,
}

// ============================================
// ACCOUNT DTOs
// ============================================

/// Health factor snapshot for a wallet
#[derive(Debug, Serialize)]
pub struct HealthFactorDto {
    pub address: String,
    /// Raw health factor in wei
    pub health_factor: String,
    /// Classified status: healthy, warning, critical, unknown
    pub status: HealthStatus,
}

// ============================================
// TOKEN DTOs
// ============================================

/// Collateral token list response
#[derive(Debug, Serialize)]
pub struct TokenListResponse {
    pub tokens: Vec<TokenInfo>,
    pub total: usize,
}

// ============================================
// OPERATION DTOs
// ============================================

/// Deposit or redeem collateral request
#[derive(Debug, Deserialize)]
pub struct CollateralRequest {
    pub session_id: Uuid,
    /// Address of the collateral token
    pub token_address: String,
    /// Human-readable amount ("1.5")
    pub amount: String,
}

/// Deposit collateral and mint DSC in one transaction
#[derive(Debug, Deserialize)]
pub struct DepositAndMintRequest {
    pub session_id: Uuid,
    pub token_address: String,
    /// Collateral amount to deposit
    pub deposit_amount: String,
    /// DSC amount to mint
    pub mint_amount: String,
}

/// Redeem collateral by burning DSC in one transaction
#[derive(Debug, Deserialize)]
pub struct RedeemForDscRequest {
    pub session_id: Uuid,
    pub token_address: String,
    /// Collateral amount to redeem
    pub redeem_amount: String,
    /// DSC amount to burn
    pub burn_amount: String,
}

/// Mint or burn DSC request
#[derive(Debug, Deserialize)]
pub struct DscAmountRequest {
    pub session_id: Uuid,
    /// Human-readable DSC amount
    pub amount: String,
}

/// Token approval request
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub session_id: Uuid,
    pub token_address: String,
    /// Spender; defaults to the DSC engine contract
    #[serde(default)]
    pub spender_address: Option<String>,
    pub amount: String,
}

/// Test token faucet request
#[derive(Debug, Deserialize)]
pub struct FaucetRequest {
    pub session_id: Uuid,
    /// Token to mint: "wbtc" or "weth"
    pub token: String,
    pub amount: String,
}

/// Liquidation request
#[derive(Debug, Deserialize)]
pub struct LiquidateRequest {
    pub session_id: Uuid,
    /// Address of the position being liquidated
    pub user: String,
    /// Collateral token to seize
    pub collateral_address: String,
    /// DSC amount of debt to cover
    pub debt_to_cover: String,
}

// ============================================
// TRANSFER DTOs
// ============================================

/// Simulated transfer request
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub session_id: Uuid,
    /// Recipient address
    pub to: String,
    /// Human-readable amount
    pub amount: String,
    #[serde(default)]
    pub memo: Option<String>,
}

// ============================================
// CHAT DTOs
// ============================================

/// Chat message request
///
/// A wallet session id unlocks operation execution. Without one (or with
/// an id that is not a wallet session) the assistant still answers but
/// refuses to run operations.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub message: String,
}

/// Chat message response
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Conversation id to reuse on the next message
    pub session_id: Uuid,
    /// Assistant text
    pub text: String,
    /// Function the model asked to run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Result of the executed function, if it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_result: Option<FunctionResult>,
}

/// Chat history response
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub session_id: Uuid,
    pub turns: Vec<crate::assistant::ChatTurn>,
    pub total: usize,
}

// ============================================
// SETTINGS DTOs
// ============================================

/// Current gateway settings view
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsResponse {
    /// Engine backend base URL currently in use
    pub engine_url: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url: String,
    pub dsc_address: String,
    pub dsc_engine_address: String,
    pub wbtc_address: String,
    pub weth_address: String,
    pub assistant_enabled: bool,
}

/// Engine base URL override request
#[derive(Debug, Deserialize)]
pub struct EngineUrlRequest {
    pub base_url: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Root service info response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Engine backend reachability: ok or unreachable
    pub engine: String,
    /// Assistant availability: enabled or disabled
    pub assistant: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
