//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub contracts: ContractsConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Socket address string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// DSC engine backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_url")]
    pub base_url: String,

    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_engine_retries")]
    pub max_retries: u32,
}

fn default_engine_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_engine_timeout() -> u64 {
    30
}

fn default_engine_retries() -> u32 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_engine_url(),
            timeout_secs: default_engine_timeout(),
            max_retries: default_engine_retries(),
        }
    }
}

/// Protocol contract addresses
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    #[serde(default = "default_address")]
    pub dsc_engine: String,

    #[serde(default = "default_address")]
    pub dsc: String,

    #[serde(default = "default_address")]
    pub wbtc: String,

    #[serde(default = "default_address")]
    pub weth: String,
}

fn default_address() -> String {
    "0x0000000000000000000000000000000000000000".to_string()
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            dsc_engine: default_address(),
            dsc: default_address(),
            wbtc: default_address(),
            weth: default_address(),
        }
    }
}

/// Chain and explorer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
}

fn default_chain_id() -> u64 {
    31337
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_explorer_url() -> String {
    "https://etherscan.io".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            rpc_url: default_rpc_url(),
            explorer_url: default_explorer_url(),
        }
    }
}

/// AI assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_enabled")]
    pub enabled: bool,

    /// Gemini API key. Empty disables the assistant.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_assistant_model")]
    pub model: String,

    #[serde(default = "default_assistant_url")]
    pub base_url: String,
}

fn default_assistant_enabled() -> bool {
    true
}

fn default_assistant_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_assistant_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: default_assistant_enabled(),
            api_key: String::new(),
            model: default_assistant_model(),
            base_url: default_assistant_url(),
        }
    }
}

/// Wallet session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("stabledash").to_string_lossy().to_string())
        .unwrap_or_else(|| "./stabledash_data".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("stabledash").join("config.toml")),
            Some(PathBuf::from("/etc/stabledash/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Gateway overrides
        if let Ok(host) = std::env::var("STABLEDASH_HOST") {
            self.gateway.host = host;
        }
        if let Ok(port) = std::env::var("STABLEDASH_PORT") {
            if let Ok(p) = port.parse() {
                self.gateway.port = p;
            }
        }
        if let Ok(data_dir) = std::env::var("STABLEDASH_DATA_DIR") {
            self.session.data_dir = data_dir;
        }

        // Engine overrides
        if let Ok(url) = std::env::var("STABLEDASH_ENGINE_URL") {
            self.engine.base_url = url;
        }

        // Contract address overrides
        if let Ok(addr) = std::env::var("DSC_ENGINE_ADDRESS") {
            self.contracts.dsc_engine = addr;
        }
        if let Ok(addr) = std::env::var("DSC_ADDRESS") {
            self.contracts.dsc = addr;
        }
        if let Ok(addr) = std::env::var("WBTC_ADDRESS") {
            self.contracts.wbtc = addr;
        }
        if let Ok(addr) = std::env::var("WETH_ADDRESS") {
            self.contracts.weth = addr;
        }

        // Network overrides
        if let Ok(chain_id) = std::env::var("STABLEDASH_CHAIN_ID") {
            if let Ok(id) = chain_id.parse() {
                self.network.chain_id = id;
            }
        }
        if let Ok(url) = std::env::var("STABLEDASH_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Ok(url) = std::env::var("STABLEDASH_EXPLORER_URL") {
            self.network.explorer_url = url;
        }

        // Assistant overrides
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.assistant.api_key = key;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.assistant.model = model;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("STABLEDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("STABLEDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            engine: EngineConfig::default(),
            contracts: ContractsConfig::default(),
            network: NetworkConfig::default(),
            assistant: AssistantConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Stabledash Configuration
#
# Environment variables override these settings:
# - STABLEDASH_HOST / STABLEDASH_PORT
# - STABLEDASH_ENGINE_URL
# - STABLEDASH_DATA_DIR
# - DSC_ENGINE_ADDRESS / DSC_ADDRESS / WBTC_ADDRESS / WETH_ADDRESS
# - STABLEDASH_CHAIN_ID / STABLEDASH_RPC_URL / STABLEDASH_EXPLORER_URL
# - GEMINI_API_KEY / GEMINI_MODEL
# - STABLEDASH_LOG_LEVEL / STABLEDASH_LOG_FORMAT

[gateway]
# Gateway server host
host = "0.0.0.0"

# Gateway server port
port = 8080

# Allowed CORS origins (dashboard dev server)
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[engine]
# DSC engine backend URL
base_url = "http://localhost:8000"

# Request timeout in seconds
timeout_secs = 30

# Retries on connection failure
max_retries = 2

[contracts]
# Protocol contract addresses
dsc_engine = "0x0000000000000000000000000000000000000000"
dsc = "0x0000000000000000000000000000000000000000"
wbtc = "0x0000000000000000000000000000000000000000"
weth = "0x0000000000000000000000000000000000000000"

[network]
# Expected chain for connecting wallets (31337 = local anvil)
chain_id = 31337

# RPC endpoint
rpc_url = "http://localhost:8545"

# Block explorer base URL for transaction links
explorer_url = "https://etherscan.io"

[assistant]
# Enable the AI assistant
enabled = true

# Gemini API key (empty disables the assistant)
api_key = ""

# Gemini model
model = "gemini-1.5-flash"

[session]
# Directory for persisted wallet sessions
data_dir = "~/.local/share/stabledash"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/stabledash/stabledash.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.engine.base_url, "http://localhost:8000");
        assert_eq!(config.network.chain_id, 31337);
        assert_eq!(
            config.contracts.dsc_engine,
            "0x0000000000000000000000000000000000000000"
        );
        assert!(config.assistant.enabled);
        assert!(config.assistant.api_key.is_empty());
    }

    #[test]
    fn test_generated_config_parses() {
        let content = generate_default_config();
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.engine.base_url, "http://localhost:8000");
        assert_eq!(config.assistant.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [gateway]
            port = 9090

            [engine]
            base_url = "http://engine:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.port, 9090);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.engine.base_url, "http://engine:8000");
        assert_eq!(config.engine.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }
}
