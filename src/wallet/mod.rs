//! Wallet Sessions and Positions
//!
//! Connected-wallet bookkeeping and the account aggregation that feeds the
//! dashboard: which collateral tokens exist, what a wallet has deposited,
//! what it has minted, and how healthy the position is.

mod portfolio;
mod session;
mod tokens;

pub use portfolio::{AccountOverview, CollateralPosition, HealthStatus, PortfolioService};
pub use session::{SessionStore, WalletSession};
pub use tokens::{TokenInfo, TokenRegistry};
