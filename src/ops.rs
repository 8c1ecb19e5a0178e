//! Wallet Operations
//!
//! The validated operation layer shared by the HTTP routes, the AI
//! assistant, and the CLI. Every operation follows the same path: check
//! the inputs, convert human amounts to wei, call the engine, wrap the
//! result in a user-facing summary with an explorer link. Engine failures
//! keep their structured detail for the log while callers get the
//! operation-level message.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ContractsConfig, NetworkConfig};
use crate::engine::{ApproveOutcome, EngineClient, EngineError};
use crate::units::{explorer_tx_url, format_address, is_address, to_wei, UnitsError};

/// Result of a successful operation
#[derive(Debug, Clone, Serialize)]
pub struct OpOutcome {
    /// User-facing summary ("Successfully deposited 1.5 collateral")
    pub summary: String,
    pub tx_hash: Option<String>,
    pub explorer_url: Option<String>,
}

/// A fabricated transfer from the demo transfer utility
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedTransfer {
    pub tx_hash: String,
    pub to: String,
    pub amount: String,
    pub memo: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Faucet tokens available for test minting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetToken {
    Wbtc,
    Weth,
}

impl FaucetToken {
    pub fn symbol(&self) -> &'static str {
        match self {
            FaucetToken::Wbtc => "WBTC",
            FaucetToken::Weth => "WETH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("wbtc") {
            Some(FaucetToken::Wbtc)
        } else if s.eq_ignore_ascii_case("weth") {
            Some(FaucetToken::Weth)
        } else {
            None
        }
    }
}

/// Errors from the operation layer
#[derive(Debug, Error)]
pub enum OpError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    InvalidAmount(#[from] UnitsError),

    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Failed to {action}: {source}")]
    Engine {
        action: &'static str,
        source: EngineError,
    },
}

impl OpError {
    /// Validation errors are the caller's fault and map to 400s
    pub fn is_validation(&self) -> bool {
        !matches!(self, OpError::Engine { .. })
    }
}

/// Validated operations against the DSC engine
pub struct Operations {
    engine: Arc<EngineClient>,
    contracts: ContractsConfig,
    explorer_url: String,
}

impl Operations {
    pub fn new(
        engine: Arc<EngineClient>,
        contracts: ContractsConfig,
        network: &NetworkConfig,
    ) -> Self {
        Self {
            engine,
            contracts,
            explorer_url: network.explorer_url.clone(),
        }
    }

    /// Deposit collateral for a wallet
    pub async fn deposit_collateral(
        &self,
        user: &str,
        token: &str,
        amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let token = valid_address(token)?;
        let wei = positive_wei(amount)?;

        let tx_hash = self
            .engine
            .deposit_collateral(user, token, &wei)
            .await
            .map_err(engine_err("deposit collateral"))?;

        tracing::info!("Deposited {} collateral for {}", amount, format_address(user));
        Ok(self.outcome(
            format!("Successfully deposited {} collateral", amount),
            tx_hash,
        ))
    }

    /// Mint DSC against deposited collateral
    pub async fn mint_dsc(&self, user: &str, amount: &str) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let wei = positive_wei(amount)?;

        let tx_hash = self
            .engine
            .mint_dsc(user, &wei)
            .await
            .map_err(engine_err("mint DSC"))?;

        tracing::info!("Minted {} DSC for {}", amount, format_address(user));
        Ok(self.outcome(format!("Successfully minted {} DSC", amount), tx_hash))
    }

    /// Deposit collateral and mint DSC in one transaction
    pub async fn deposit_and_mint(
        &self,
        user: &str,
        token: &str,
        deposit_amount: &str,
        mint_amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let token = valid_address(token)?;
        let deposit_wei = positive_wei(deposit_amount)?;
        let mint_wei = positive_wei(mint_amount)?;

        let tx_hash = self
            .engine
            .deposit_collateral_and_mint_dsc(user, token, &deposit_wei, &mint_wei)
            .await
            .map_err(engine_err("deposit collateral and mint DSC"))?;

        Ok(self.outcome(
            format!(
                "Successfully deposited {} collateral and minted {} DSC",
                deposit_amount, mint_amount
            ),
            tx_hash,
        ))
    }

    /// Burn DSC to reduce debt
    pub async fn burn_dsc(&self, user: &str, amount: &str) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let wei = positive_wei(amount)?;

        let tx_hash = self
            .engine
            .burn_dsc(user, &wei)
            .await
            .map_err(engine_err("burn DSC"))?;

        tracing::info!("Burned {} DSC for {}", amount, format_address(user));
        Ok(self.outcome(format!("Successfully burned {} DSC", amount), tx_hash))
    }

    /// Withdraw deposited collateral
    pub async fn redeem_collateral(
        &self,
        user: &str,
        token: &str,
        amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let token = valid_address(token)?;
        let wei = positive_wei(amount)?;

        let tx_hash = self
            .engine
            .redeem_collateral(user, token, &wei)
            .await
            .map_err(engine_err("redeem collateral"))?;

        Ok(self.outcome(
            format!("Successfully redeemed {} collateral", amount),
            tx_hash,
        ))
    }

    /// Burn DSC and withdraw collateral in one transaction
    pub async fn redeem_for_dsc(
        &self,
        user: &str,
        token: &str,
        redeem_amount: &str,
        burn_amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let token = valid_address(token)?;
        let redeem_wei = positive_wei(redeem_amount)?;
        let burn_wei = positive_wei(burn_amount)?;

        let tx_hash = self
            .engine
            .redeem_collateral_for_dsc(user, token, &redeem_wei, &burn_wei)
            .await
            .map_err(engine_err("redeem collateral for DSC"))?;

        Ok(self.outcome(
            format!(
                "Successfully redeemed {} collateral and burned {} DSC",
                redeem_amount, burn_amount
            ),
            tx_hash,
        ))
    }

    /// Liquidate an undercollateralized position
    pub async fn liquidate(
        &self,
        user: &str,
        collateral: &str,
        debt_to_cover: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let collateral = valid_address(collateral)?;
        let wei = positive_wei(debt_to_cover)?;

        let tx_hash = self
            .engine
            .liquidate(user, collateral, &wei)
            .await
            .map_err(engine_err("liquidate position"))?;

        tracing::info!(
            "Liquidated {} DSC of debt for {}",
            debt_to_cover,
            format_address(user)
        );
        Ok(self.outcome(
            format!(
                "Successfully liquidated {} DSC of debt for {}",
                debt_to_cover,
                format_address(user)
            ),
            tx_hash,
        ))
    }

    /// Approve a spender for a token amount
    ///
    /// The spender defaults to the DSC engine contract, which is what the
    /// dashboard always approves.
    pub async fn approve(
        &self,
        user: &str,
        token: &str,
        spender: Option<&str>,
        amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let token = valid_address(token)?;
        let spender = valid_address(spender.unwrap_or(&self.contracts.dsc_engine))?;
        let wei = positive_wei(amount)?;

        let result = self
            .engine
            .approve_tokens(user, token, spender, &wei)
            .await
            .map_err(engine_err("approve tokens"))?;

        Ok(match result {
            ApproveOutcome::Submitted { tx_hash } => self.outcome(
                format!("Successfully approved {} tokens", amount),
                tx_hash,
            ),
            ApproveOutcome::AlreadySufficient { message } => OpOutcome {
                summary: message,
                tx_hash: None,
                explorer_url: None,
            },
        })
    }

    /// Mint test tokens from the faucet
    pub async fn faucet(
        &self,
        user: &str,
        token: FaucetToken,
        amount: &str,
    ) -> Result<OpOutcome, OpError> {
        let user = valid_address(user)?;
        let wei = positive_wei(amount)?;

        let result = match token {
            FaucetToken::Wbtc => self.engine.mint_wbtc(user, &wei).await,
            FaucetToken::Weth => self.engine.mint_weth(user, &wei).await,
        };
        let tx_hash = result.map_err(match token {
            FaucetToken::Wbtc => engine_err("mint WBTC"),
            FaucetToken::Weth => engine_err("mint WETH"),
        })?;

        Ok(self.outcome(
            format!("Successfully minted {} {}", amount, token.symbol()),
            tx_hash,
        ))
    }

    /// Demo transfer that fabricates a transaction without touching the
    /// chain.
    pub fn simulate_transfer(
        &self,
        to: &str,
        amount: &str,
        memo: Option<String>,
    ) -> Result<SimulatedTransfer, OpError> {
        let to = valid_address(to)?;
        positive_wei(amount)?;

        Ok(SimulatedTransfer {
            tx_hash: fake_tx_hash(),
            to: to.to_string(),
            amount: amount.to_string(),
            memo,
            timestamp: Utc::now(),
        })
    }

    fn outcome(&self, summary: String, tx_hash: String) -> OpOutcome {
        let explorer_url = Some(explorer_tx_url(&self.explorer_url, &tx_hash));
        OpOutcome {
            summary,
            tx_hash: Some(tx_hash),
            explorer_url,
        }
    }
}

fn valid_address(addr: &str) -> Result<&str, OpError> {
    if is_address(addr) {
        Ok(addr)
    } else {
        Err(OpError::InvalidAddress(addr.to_string()))
    }
}

fn positive_wei(amount: &str) -> Result<String, OpError> {
    let wei = to_wei(amount)?;
    if wei == "0" {
        return Err(OpError::ZeroAmount);
    }
    Ok(wei)
}

fn engine_err(action: &'static str) -> impl FnOnce(EngineError) -> OpError {
    move |source| {
        tracing::error!("Operation '{}' failed: {}", action, source);
        OpError::Engine { action, source }
    }
}

/// Random 32-byte hash, hex encoded with the usual 0x prefix
fn fake_tx_hash() -> String {
    let bytes: [u8; 32] = rand::random();
    let mut hash = String::with_capacity(66);
    hash.push_str("0x");
    for byte in bytes {
        let _ = write!(hash, "{:02x}", byte);
    }
    hash
}
