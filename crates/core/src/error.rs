//! Error types for the Tidewater domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum.

use thiserror::Error;

/// The top-level error type for all Tidewater operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Brokerage error: {0}")]
    Brokerage(#[from] BrokerageError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures talking to the paper-trading brokerage.
#[derive(Debug, Clone, Error)]
pub enum BrokerageError {
    #[error("Brokerage credentials missing: {0}")]
    NotConfigured(String),

    #[error("Brokerage API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Brokerage network error: {0}")]
    Network(String),

    #[error("Unexpected brokerage response: {0}")]
    Decode(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Failures talking to the custodial wallet service.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Wallet credentials missing: {0}")]
    NotConfigured(String),

    #[error("Invalid transfer amount: {0}")]
    InvalidAmount(f64),

    #[error("Wallet API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Wallet network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
