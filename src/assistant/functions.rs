//! Assistant Functions
//!
//! The operations the model is allowed to trigger, declared in Gemini's
//! schema dialect, plus the executor that maps a parsed call onto the
//! operation layer. Result strings are what the conversation shows the
//! user verbatim.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use super::model::{FunctionCall, FunctionDecl};
use crate::config::ContractsConfig;
use crate::ops::{FaucetToken, OpError, OpOutcome, Operations};
use crate::units::from_wei;
use crate::wallet::PortfolioService;

/// Outcome of an executed function call
#[derive(Debug, Clone, Serialize)]
pub struct FunctionResult {
    pub success: bool,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl FunctionResult {
    fn ok(result: String, tx_hash: Option<String>) -> Self {
        Self {
            success: true,
            result,
            tx_hash,
        }
    }

    fn failed(result: String) -> Self {
        Self {
            success: false,
            result,
            tx_hash: None,
        }
    }
}

/// The standing instructions sent ahead of every conversation
pub fn system_prompt(contracts: &ContractsConfig) -> String {
    format!(
        "You are a helpful DSC (Decentralized Stablecoin) assistant. You can help users with \
         minting tokens, approving tokens, depositing collateral, minting DSC, and other \
         operations. When users ask about these operations, guide them step by step and offer \
         to perform these actions for them.\n\n\
         For token addresses, use these references:\n\
         - WETH: {}\n\
         - WBTC: {}\n\
         - DSC: {}\n\n\
         Always provide clear, step-by-step guidance and offer to help with specific operations.",
        contracts.weth, contracts.wbtc, contracts.dsc
    )
}

/// Declarations for every function the model may call
pub fn function_declarations() -> Vec<FunctionDecl> {
    let string_param = |description: &str| {
        json!({
            "type": "STRING",
            "description": description,
        })
    };

    vec![
        FunctionDecl {
            name: "mintWETH".to_string(),
            description: "Mint test WETH tokens to the user's wallet".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "amount": string_param("Amount of WETH to mint"),
                },
                "required": ["amount"],
            }),
        },
        FunctionDecl {
            name: "mintWBTC".to_string(),
            description: "Mint test WBTC tokens to the user's wallet".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "amount": string_param("Amount of WBTC to mint"),
                },
                "required": ["amount"],
            }),
        },
        FunctionDecl {
            name: "approveToken".to_string(),
            description: "Approve tokens to be used by the DSC contract".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "tokenAddress": string_param("Address of the token to approve"),
                    "amount": string_param("Amount to approve"),
                },
                "required": ["tokenAddress", "amount"],
            }),
        },
        FunctionDecl {
            name: "depositCollateral".to_string(),
            description: "Deposit collateral to the DSC contract".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "tokenAddress": string_param("Address of the token to deposit"),
                    "amount": string_param("Amount to deposit"),
                },
                "required": ["tokenAddress", "amount"],
            }),
        },
        FunctionDecl {
            name: "mintDSC".to_string(),
            description: "Mint DSC stablecoin".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "amount": string_param("Amount of DSC to mint"),
                },
                "required": ["amount"],
            }),
        },
        FunctionDecl {
            name: "burnDSC".to_string(),
            description: "Burn DSC stablecoin".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "amount": string_param("Amount of DSC to burn"),
                },
                "required": ["amount"],
            }),
        },
        FunctionDecl {
            name: "redeemCollateral".to_string(),
            description: "Redeem collateral from the DSC contract".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "tokenAddress": string_param("Address of the token to redeem"),
                    "amount": string_param("Amount to redeem"),
                },
                "required": ["tokenAddress", "amount"],
            }),
        },
        FunctionDecl {
            name: "depositAndMint".to_string(),
            description: "Deposit collateral and mint DSC in one transaction".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "tokenAddress": string_param("Address of the token to deposit"),
                    "depositAmount": string_param("Amount to deposit"),
                    "mintAmount": string_param("Amount of DSC to mint"),
                },
                "required": ["tokenAddress", "depositAmount", "mintAmount"],
            }),
        },
        FunctionDecl {
            name: "getBalance".to_string(),
            description: "Get the balance of a token for the user".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "tokenAddress": string_param("Address of the token to check balance for"),
                },
                "required": ["tokenAddress"],
            }),
        },
        FunctionDecl {
            name: "getHealthFactor".to_string(),
            description: "Get the health factor of the user's position".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {},
                "required": [],
            }),
        },
    ]
}

/// Executes parsed function calls against the operation layer
pub struct FunctionExecutor {
    ops: Arc<Operations>,
    portfolio: Arc<PortfolioService>,
}

impl FunctionExecutor {
    pub fn new(ops: Arc<Operations>, portfolio: Arc<PortfolioService>) -> Self {
        Self { ops, portfolio }
    }

    /// Run one function call for a connected wallet
    pub async fn execute(&self, call: &FunctionCall, user: &str) -> FunctionResult {
        tracing::info!("Assistant executing function '{}'", call.name);

        match call.name.as_str() {
            "mintWETH" => {
                self.run_op("mint WETH", call, &["amount"], |args| async move {
                    self.ops.faucet(user, FaucetToken::Weth, &args[0]).await
                })
                .await
            }
            "mintWBTC" => {
                self.run_op("mint WBTC", call, &["amount"], |args| async move {
                    self.ops.faucet(user, FaucetToken::Wbtc, &args[0]).await
                })
                .await
            }
            "approveToken" => {
                self.run_op(
                    "approve tokens",
                    call,
                    &["tokenAddress", "amount"],
                    |args| async move { self.ops.approve(user, &args[0], None, &args[1]).await },
                )
                .await
            }
            "depositCollateral" => {
                self.run_op(
                    "deposit collateral",
                    call,
                    &["tokenAddress", "amount"],
                    |args| async move {
                        self.ops.deposit_collateral(user, &args[0], &args[1]).await
                    },
                )
                .await
            }
            "mintDSC" => {
                self.run_op("mint DSC", call, &["amount"], |args| async move {
                    self.ops.mint_dsc(user, &args[0]).await
                })
                .await
            }
            "burnDSC" => {
                self.run_op("burn DSC", call, &["amount"], |args| async move {
                    self.ops.burn_dsc(user, &args[0]).await
                })
                .await
            }
            "redeemCollateral" => {
                self.run_op(
                    "redeem collateral",
                    call,
                    &["tokenAddress", "amount"],
                    |args| async move {
                        self.ops.redeem_collateral(user, &args[0], &args[1]).await
                    },
                )
                .await
            }
            "depositAndMint" => {
                self.run_op(
                    "deposit collateral and mint DSC",
                    call,
                    &["tokenAddress", "depositAmount", "mintAmount"],
                    |args| async move {
                        self.ops
                            .deposit_and_mint(user, &args[0], &args[1], &args[2])
                            .await
                    },
                )
                .await
            }
            "getBalance" => self.get_balance(call, user).await,
            "getHealthFactor" => self.get_health_factor(user).await,
            other => FunctionResult::failed(format!("Function {} not implemented", other)),
        }
    }

    async fn run_op<F, Fut>(
        &self,
        action: &str,
        call: &FunctionCall,
        arg_names: &[&str],
        op: F,
    ) -> FunctionResult
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: std::future::Future<Output = Result<OpOutcome, OpError>>,
    {
        let mut args = Vec::with_capacity(arg_names.len());
        for name in arg_names {
            match call.arg(name) {
                Some(value) => args.push(value),
                None => {
                    return FunctionResult::failed(format!(
                        "Failed to {}: Missing argument '{}'",
                        action, name
                    ))
                }
            }
        }

        match op(args).await {
            Ok(outcome) => FunctionResult::ok(outcome.summary, outcome.tx_hash),
            Err(e) => FunctionResult::failed(format_failure(action, &e)),
        }
    }

    async fn get_balance(&self, call: &FunctionCall, user: &str) -> FunctionResult {
        let token = match call.arg("tokenAddress") {
            Some(token) => token,
            None => {
                return FunctionResult::failed(
                    "Failed to get balance: Missing argument 'tokenAddress'".to_string(),
                )
            }
        };

        match self.portfolio.token_balance(user, &token).await {
            Ok(position) => {
                let human = from_wei(&position.balance).unwrap_or(position.balance);
                FunctionResult::ok(format!("Your balance is {}", human), None)
            }
            Err(e) => FunctionResult::failed(format!("Failed to get balance: {}", e)),
        }
    }

    async fn get_health_factor(&self, user: &str) -> FunctionResult {
        match self.portfolio.health(user).await {
            Ok((health_factor, _status)) => {
                let human = from_wei(&health_factor).unwrap_or(health_factor);
                FunctionResult::ok(format!("Your health factor is {}", human), None)
            }
            Err(e) => FunctionResult::failed(format!("Failed to get health factor: {}", e)),
        }
    }
}

fn format_failure(action: &str, error: &OpError) -> String {
    match error {
        OpError::Engine { source, .. } => format!("Failed to {}: {}", action, source),
        other => format!("Failed to {}: {}", action, other),
    }
}
