//! Configuration loading, validation, and management for Tidewater.
//!
//! Loads configuration from `~/.tidewater/config.toml` with environment
//! variable overrides for credentials. Validates all settings at startup.
//! Missing credentials are not an error here: the affected integration
//! reports itself unconfigured and `tidewater doctor` flags it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.tidewater/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM assistant settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Paper-trading brokerage settings
    #[serde(default)]
    pub brokerage: BrokerageConfig,

    /// Custodial wallet settings
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Drought subsidy rules
    #[serde(default)]
    pub subsidy: SubsidyConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Override the Messages API base URL (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on model → tool → model round trips per chat message
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tool_iterations() -> u32 {
    8
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BrokerageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Trading API (account, positions, orders)
    #[serde(default = "default_trading_url")]
    pub trading_url: String,

    /// Market data API (quotes)
    #[serde(default = "default_data_url")]
    pub data_url: String,

    /// How many recent orders to pull back into context after a trade
    #[serde(default = "default_recent_orders")]
    pub recent_orders: u32,
}

fn default_trading_url() -> String {
    "https://paper-api.alpaca.markets".into()
}
fn default_data_url() -> String {
    "https://data.alpaca.markets".into()
}
fn default_recent_orders() -> u32 {
    10
}

impl Default for BrokerageConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            trading_url: default_trading_url(),
            data_url: default_data_url(),
            recent_orders: default_recent_orders(),
        }
    }
}

impl std::fmt::Debug for BrokerageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerageConfig")
            .field("api_key", &redact(&self.api_key))
            .field("secret_key", &redact(&self.secret_key))
            .field("trading_url", &self.trading_url)
            .field("data_url", &self.data_url)
            .field("recent_orders", &self.recent_orders)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_wallet_base_url")]
    pub base_url: String,

    /// Dated API version used for balances and transfers
    #[serde(default = "default_wallet_api_version")]
    pub api_version: String,

    /// API version that serves wallet activity
    #[serde(default = "default_activity_api_version")]
    pub activity_api_version: String,

    /// Wallet that funds subsidies
    #[serde(default = "default_treasury_wallet")]
    pub treasury_wallet: String,

    /// The farmer's wallet locator
    #[serde(default = "default_farmer_wallet")]
    pub farmer_wallet: String,

    /// On-chain address that receives subsidies by default
    #[serde(default = "default_farmer_address")]
    pub farmer_address: String,

    #[serde(default = "default_chain")]
    pub chain: String,

    #[serde(default = "default_token")]
    pub token: String,
}

fn default_wallet_base_url() -> String {
    "https://staging.crossmint.com/api".into()
}
fn default_wallet_api_version() -> String {
    "2025-06-09".into()
}
fn default_activity_api_version() -> String {
    "unstable".into()
}
fn default_treasury_wallet() -> String {
    "userId:unclesam:evm".into()
}
fn default_farmer_wallet() -> String {
    "userId:farmerted:evm".into()
}
fn default_farmer_address() -> String {
    "0x639A356DB809fA45A367Bc71A6D766dF2e9C6D15".into()
}
fn default_chain() -> String {
    "ethereum-sepolia".into()
}
fn default_token() -> String {
    "usdc".into()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_wallet_base_url(),
            api_version: default_wallet_api_version(),
            activity_api_version: default_activity_api_version(),
            treasury_wallet: default_treasury_wallet(),
            farmer_wallet: default_farmer_wallet(),
            farmer_address: default_farmer_address(),
            chain: default_chain(),
            token: default_token(),
        }
    }
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("treasury_wallet", &self.treasury_wallet)
            .field("farmer_wallet", &self.farmer_wallet)
            .field("farmer_address", &self.farmer_address)
            .field("chain", &self.chain)
            .field("token", &self.token)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsidyConfig {
    /// Drought index (0-100) above which a farmer is eligible
    #[serde(default = "default_drought_threshold")]
    pub drought_threshold: f64,

    #[serde(default = "default_region")]
    pub default_region: String,
}

fn default_drought_threshold() -> f64 {
    70.0
}
fn default_region() -> String {
    "California".into()
}

impl Default for SubsidyConfig {
    fn default() -> Self {
        Self {
            drought_threshold: default_drought_threshold(),
            default_region: default_region(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Browser origin allowed by CORS (the dashboard UI)
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origin() -> String {
    "http://localhost:3000".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.tidewater/config.toml).
    ///
    /// Credentials missing from the file are taken from the environment:
    /// - `ANTHROPIC_API_KEY`
    /// - `ALPACA_API_KEY` / `ALPACA_SECRET_KEY`
    /// - `CROSSMINT_API_KEY`
    ///
    /// `TIDEWATER_MODEL` overrides the assistant model.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Fill unset credentials (and the model override) from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.assistant.api_key.is_none() {
            self.assistant.api_key = lookup("ANTHROPIC_API_KEY");
        }
        if self.brokerage.api_key.is_none() {
            self.brokerage.api_key = lookup("ALPACA_API_KEY");
        }
        if self.brokerage.secret_key.is_none() {
            self.brokerage.secret_key = lookup("ALPACA_SECRET_KEY");
        }
        if self.wallet.api_key.is_none() {
            self.wallet.api_key = lookup("CROSSMINT_API_KEY");
        }
        if let Some(model) = lookup("TIDEWATER_MODEL") {
            self.assistant.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tidewater")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.assistant.temperature) {
            return Err(ConfigError::ValidationError(
                "assistant.temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self.assistant.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.max_tool_iterations must be at least 1".into(),
            ));
        }

        if !(0.0..=100.0).contains(&self.subsidy.drought_threshold) {
            return Err(ConfigError::ValidationError(
                "subsidy.drought_threshold must be between 0 and 100".into(),
            ));
        }

        Ok(())
    }

    /// Names of integrations that have no credentials configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.assistant.api_key.is_none() {
            missing.push("assistant (ANTHROPIC_API_KEY)");
        }
        if self.brokerage.api_key.is_none() || self.brokerage.secret_key.is_none() {
            missing.push("brokerage (ALPACA_API_KEY / ALPACA_SECRET_KEY)");
        }
        if self.wallet.api_key.is_none() {
            missing.push("wallet (CROSSMINT_API_KEY)");
        }
        missing
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
