//! Collateral Token Registry
//!
//! The engine reports collateral tokens as bare addresses. The registry
//! attaches display metadata and supplies the hardcoded WBTC/WETH fallback
//! used when the engine cannot be asked.

use serde::{Deserialize, Serialize};

use crate::config::ContractsConfig;

/// A collateral token with display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub name: String,
}

/// Resolves token addresses to metadata based on the configured contracts
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    wbtc: String,
    weth: String,
}

impl TokenRegistry {
    pub fn new(contracts: &ContractsConfig) -> Self {
        Self {
            wbtc: contracts.wbtc.clone(),
            weth: contracts.weth.clone(),
        }
    }

    /// Attach metadata to a token address. Addresses that match neither
    /// configured contract come back as UNKNOWN.
    pub fn resolve(&self, address: &str) -> TokenInfo {
        let (symbol, name) = if address.eq_ignore_ascii_case(&self.wbtc) {
            ("WBTC", "Wrapped Bitcoin")
        } else if address.eq_ignore_ascii_case(&self.weth) {
            ("WETH", "Wrapped Ether")
        } else {
            ("UNKNOWN", "Unknown Token")
        };

        TokenInfo {
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }

    /// The hardcoded token list used when the engine is unreachable or
    /// reports nothing.
    pub fn fallback_tokens(&self) -> Vec<TokenInfo> {
        vec![
            TokenInfo {
                address: self.wbtc.clone(),
                symbol: "WBTC".to_string(),
                name: "Wrapped Bitcoin".to_string(),
            },
            TokenInfo {
                address: self.weth.clone(),
                symbol: "WETH".to_string(),
                name: "Wrapped Ether".to_string(),
            },
        ]
    }

    /// Look up the configured address for a known symbol ("WBTC"/"WETH")
    pub fn address_for_symbol(&self, symbol: &str) -> Option<&str> {
        if symbol.eq_ignore_ascii_case("WBTC") {
            Some(&self.wbtc)
        } else if symbol.eq_ignore_ascii_case("WETH") {
            Some(&self.weth)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_contracts() -> ContractsConfig {
        ContractsConfig {
            dsc_engine: "0x00000000000000000000000000000000000000e1".to_string(),
            dsc: "0x00000000000000000000000000000000000000d5".to_string(),
            wbtc: "0x0000000000000000000000000000000000000b7c".to_string(),
            weth: "0x0000000000000000000000000000000000000e74".to_string(),
        }
    }

    #[test]
    fn test_resolve_known_tokens() {
        let registry = TokenRegistry::new(&test_contracts());

        let wbtc = registry.resolve("0x0000000000000000000000000000000000000b7c");
        assert_eq!(wbtc.symbol, "WBTC");
        assert_eq!(wbtc.name, "Wrapped Bitcoin");

        let weth = registry.resolve("0x0000000000000000000000000000000000000E74");
        assert_eq!(weth.symbol, "WETH");
        assert_eq!(weth.name, "Wrapped Ether");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = TokenRegistry::new(&test_contracts());
        let wbtc = registry.resolve("0x0000000000000000000000000000000000000B7C");
        assert_eq!(wbtc.symbol, "WBTC");
        // Original casing preserved in the result
        assert_eq!(wbtc.address, "0x0000000000000000000000000000000000000B7C");
    }

    #[test]
    fn test_resolve_unknown_token() {
        let registry = TokenRegistry::new(&test_contracts());
        let other = registry.resolve("0x1234567890abcdef1234567890abcdef12345678");
        assert_eq!(other.symbol, "UNKNOWN");
        assert_eq!(other.name, "Unknown Token");
    }

    #[test]
    fn test_fallback_tokens() {
        let registry = TokenRegistry::new(&test_contracts());
        let tokens = registry.fallback_tokens();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "WBTC");
        assert_eq!(tokens[1].symbol, "WETH");
    }

    #[test]
    fn test_address_for_symbol() {
        let registry = TokenRegistry::new(&test_contracts());
        assert_eq!(
            registry.address_for_symbol("weth"),
            Some("0x0000000000000000000000000000000000000e74")
        );
        assert_eq!(registry.address_for_symbol("DSC"), None);
    }
}
