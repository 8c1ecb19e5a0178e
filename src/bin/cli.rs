//! Stabledash CLI
//!
//! Command-line interface for the DSC dashboard gateway:
//! - Connect a wallet and inspect its position
//! - Deposit, redeem, mint, and burn
//! - Talk to the AI assistant
//! - Check gateway status

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "stabledash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "DSC dashboard gateway client")]
#[command(long_about = "Stabledash is the service layer of a DSC (Decentralized Stablecoin) dashboard.\nConnect a wallet, manage collateral and minted DSC, and chat with the assistant.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Gateway server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Wallet session id from `connect`
    #[arg(short, long, global = true)]
    pub session: Option<Uuid>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show gateway status
    Status,

    /// Connect a wallet and print the session id
    Connect {
        /// Wallet address (0x + 40 hex chars)
        address: String,
        /// Chain id the wallet is on (default: the gateway's network)
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Disconnect the current session
    Disconnect,

    /// Show the account overview for the current session
    Overview,

    /// List collateral tokens
    Tokens,

    /// Deposit collateral
    Deposit {
        /// Collateral token address
        token: String,
        /// Amount in token units (e.g. 1.5)
        amount: String,
    },

    /// Redeem deposited collateral
    Redeem {
        /// Collateral token address
        token: String,
        /// Amount in token units
        amount: String,
    },

    /// Deposit collateral and mint DSC in one transaction
    DepositAndMint {
        /// Collateral token address
        token: String,
        /// Collateral amount to deposit
        deposit_amount: String,
        /// DSC amount to mint
        mint_amount: String,
    },

    /// Mint DSC against deposited collateral
    Mint {
        /// DSC amount
        amount: String,
    },

    /// Burn minted DSC
    Burn {
        /// DSC amount
        amount: String,
    },

    /// Approve the DSC engine to spend a token
    Approve {
        /// Token address
        token: String,
        /// Amount in token units
        amount: String,
        /// Spender address (default: the DSC engine contract)
        #[arg(long)]
        spender: Option<String>,
    },

    /// Mint test tokens from the faucet
    Faucet {
        /// Token to mint: wbtc or weth
        token: String,
        /// Amount in token units
        amount: String,
    },

    /// Liquidate an undercollateralized position
    Liquidate {
        /// Address of the position being liquidated
        user: String,
        /// Collateral token to seize
        collateral: String,
        /// DSC amount of debt to cover
        debt_to_cover: String,
    },

    /// Simulate a transfer (no chain interaction)
    Transfer {
        /// Recipient address
        to: String,
        /// Amount in token units
        amount: String,
        /// Optional memo
        #[arg(long)]
        memo: Option<String>,
    },

    /// Send a message to the AI assistant
    Chat {
        /// The message
        message: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Stabledash v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "Gateway:   {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Engine:    {}",
                        health["engine"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Assistant: {}",
                        health["assistant"].as_str().unwrap_or("unknown")
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("Gateway returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Stabledash gateway at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the gateway server is running:");
                    eprintln!("  cargo run --bin stabledash");
                    std::process::exit(1);
                }
            }
        }

        Commands::Connect { address, chain_id } => {
            let body = serde_json::json!({
                "address": address,
                "chain_id": chain_id,
            });

            let data =
                post_json(&client, &cli.api_url, "/api/session/connect", &body).await?;

            let session_id = data["session"]["id"].as_str().unwrap_or("-");
            println!("Connected {}", data["session"]["address"].as_str().unwrap_or("-"));
            println!("Session: {}", session_id);
            println!();
            println!("Pass it to the other commands:");
            println!("  stabledash-cli --session {} overview", session_id);
        }

        Commands::Disconnect => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({ "session_id": session_id });

            let data =
                post_json(&client, &cli.api_url, "/api/session/disconnect", &body).await?;
            println!(
                "Disconnected {}",
                data["address"].as_str().unwrap_or("-")
            );
        }

        Commands::Overview => {
            let session_id = require_session(&cli.session);

            let response = client
                .get(format!(
                    "{}/api/account/{}/overview",
                    cli.api_url, session_id
                ))
                .send()
                .await?;

            if !response.status().is_success() {
                print_api_error(response).await;
                std::process::exit(1);
            }

            let data: serde_json::Value = response.json().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_overview(&data);
            }
        }

        Commands::Tokens => {
            let response = client
                .get(format!("{}/api/tokens", cli.api_url))
                .send()
                .await?;

            if !response.status().is_success() {
                eprintln!("Failed to fetch tokens: {}", response.status());
                std::process::exit(1);
            }

            let data: serde_json::Value = response.json().await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if let Some(tokens) = data["tokens"].as_array() {
                println!("{:<8} {:<20} {}", "Symbol", "Name", "Address");
                println!("{}", "-".repeat(72));

                for token in tokens {
                    println!(
                        "{:<8} {:<20} {}",
                        token["symbol"].as_str().unwrap_or("-"),
                        token["name"].as_str().unwrap_or("-"),
                        token["address"].as_str().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Deposit { token, amount } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "token_address": token,
                "amount": amount,
            });

            let data =
                post_json(&client, &cli.api_url, "/api/collateral/deposit", &body).await?;
            print_outcome(&data);
        }

        Commands::Redeem { token, amount } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "token_address": token,
                "amount": amount,
            });

            let data =
                post_json(&client, &cli.api_url, "/api/collateral/redeem", &body).await?;
            print_outcome(&data);
        }

        Commands::DepositAndMint {
            token,
            deposit_amount,
            mint_amount,
        } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "token_address": token,
                "deposit_amount": deposit_amount,
                "mint_amount": mint_amount,
            });

            let data = post_json(
                &client,
                &cli.api_url,
                "/api/collateral/deposit-and-mint",
                &body,
            )
            .await?;
            print_outcome(&data);
        }

        Commands::Mint { amount } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "amount": amount,
            });

            let data = post_json(&client, &cli.api_url, "/api/dsc/mint", &body).await?;
            print_outcome(&data);
        }

        Commands::Burn { amount } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "amount": amount,
            });

            let data = post_json(&client, &cli.api_url, "/api/dsc/burn", &body).await?;
            print_outcome(&data);
        }

        Commands::Approve {
            token,
            amount,
            spender,
        } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "token_address": token,
                "amount": amount,
                "spender_address": spender,
            });

            let data = post_json(&client, &cli.api_url, "/api/tokens/approve", &body).await?;
            print_outcome(&data);
        }

        Commands::Faucet { token, amount } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "token": token,
                "amount": amount,
            });

            let data = post_json(&client, &cli.api_url, "/api/tokens/faucet", &body).await?;
            print_outcome(&data);
        }

        Commands::Liquidate {
            user,
            collateral,
            debt_to_cover,
        } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "user": user,
                "collateral_address": collateral,
                "debt_to_cover": debt_to_cover,
            });

            let data = post_json(&client, &cli.api_url, "/api/liquidate", &body).await?;
            print_outcome(&data);
        }

        Commands::Transfer { to, amount, memo } => {
            let session_id = require_session(&cli.session);
            let body = serde_json::json!({
                "session_id": session_id,
                "to": to,
                "amount": amount,
                "memo": memo,
            });

            let data =
                post_json(&client, &cli.api_url, "/api/transfer/simulate", &body).await?;

            println!(
                "Simulated transfer of {} to {}",
                data["amount"].as_str().unwrap_or("-"),
                data["to"].as_str().unwrap_or("-")
            );
            println!("Tx: {}", data["tx_hash"].as_str().unwrap_or("-"));
        }

        Commands::Chat { message } => {
            let body = serde_json::json!({
                "session_id": cli.session,
                "message": message,
            });

            let data = post_json(&client, &cli.api_url, "/api/chat", &body).await?;

            println!("{}", data["text"].as_str().unwrap_or(""));

            if let Some(result) = data.get("function_result") {
                println!();
                println!("[{}]", result["result"].as_str().unwrap_or("-"));
                if let Some(tx) = result["tx_hash"].as_str() {
                    println!("Tx: {}", tx);
                }
            }

            if cli.session.is_none() {
                if let Some(id) = data["session_id"].as_str() {
                    println!();
                    println!("Continue this conversation with: --session {}", id);
                }
            }
        }

        Commands::Config { output } => {
            let config = stabledash::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// POST a JSON body and return the parsed response, exiting on API errors
async fn post_json(
    client: &reqwest::Client,
    api_url: &str,
    path: &str,
    body: &serde_json::Value,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{}{}", api_url, path))
        .json(body)
        .send()
        .await?;

    if !response.status().is_success() {
        print_api_error(response).await;
        std::process::exit(1);
    }

    Ok(response.json().await?)
}

fn require_session(session: &Option<Uuid>) -> Uuid {
    match session {
        Some(id) => *id,
        None => {
            eprintln!("This command needs a wallet session.");
            eprintln!();
            eprintln!("Connect first:");
            eprintln!("  stabledash-cli connect 0xYourAddress");
            std::process::exit(1);
        }
    }
}

async fn print_api_error(response: reqwest::Response) {
    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();

    match body["error"]["message"].as_str() {
        Some(message) => eprintln!("Failed ({}): {}", status, message),
        None => eprintln!("Failed ({})", status),
    }
}

fn print_outcome(data: &serde_json::Value) {
    println!("{}", data["summary"].as_str().unwrap_or("Done"));

    if let Some(tx) = data["tx_hash"].as_str() {
        println!("Tx: {}", tx);
    }
    if let Some(url) = data["explorer_url"].as_str() {
        println!("Explorer: {}", url);
    }
}

fn print_overview(data: &serde_json::Value) {
    println!("Account: {}", data["address"].as_str().unwrap_or("-"));

    if let Some(error) = data["error"].as_str() {
        println!();
        println!("Warning: {}", error);
    }

    println!();
    println!(
        "DSC minted:       {}",
        format_wei(data["total_dsc_minted"].as_str())
    );
    println!(
        "Collateral (USD): {}",
        format_wei(data["collateral_value_usd"].as_str())
    );
    println!(
        "Health factor:    {} ({})",
        format_wei(data["health_factor"].as_str()),
        data["health"].as_str().unwrap_or("unknown")
    );

    if let Some(ratio) = data["collateralization_ratio"].as_f64() {
        println!("Collateral ratio: {:.0}%", ratio * 100.0);
    }

    let positions = match data["positions"].as_array() {
        Some(p) if !p.is_empty() => p,
        _ => {
            println!();
            println!("No collateral deposited yet.");
            return;
        }
    };

    println!();
    println!("{:<8} {:<16} {}", "Token", "Balance", "USD Value");
    println!("{}", "-".repeat(44));

    for position in positions {
        println!(
            "{:<8} {:<16} {}",
            position["token"]["symbol"].as_str().unwrap_or("-"),
            format_wei(position["balance"].as_str()),
            format_wei(position["usd_value"].as_str())
        );
    }
}

/// Render a wei string as a decimal amount, falling back to "-"
fn format_wei(wei: Option<&str>) -> String {
    wei.and_then(|w| stabledash::units::from_wei(w).ok())
        .unwrap_or_else(|| "-".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
