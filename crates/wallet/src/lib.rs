//! Custodial wallet access and drought subsidy rules for Tidewater.
//!
//! [`Wallet`] reads the farmer's USDC balance and activity and moves USDC
//! from the treasury wallet. Every read degrades to [`Sourced::Fallback`]
//! demo data rather than failing, so the dashboard and the assistant keep
//! answering when the wallet service is unreachable.

pub mod crossmint;
pub mod drought;

pub use crossmint::CrossmintClient;
pub use drought::{
    DroughtAssessment, DroughtIndexSource, DroughtMonitor, FixedIndex, RandomIndex, Severity,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidewater_core::Sourced;
use tidewater_core::error::WalletError;

/// Balance used when the wallet service cannot be reached.
pub const FALLBACK_BALANCE: f64 = 10000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub wallet_id: String,
    pub usdc_balance: f64,
    pub currency: String,
    pub network: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount: f64,

    /// Destination address; the farmer's address when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub success: bool,
    pub amount: f64,
    pub currency: String,
    pub from: String,
    pub to: String,
    pub recipient_address: String,
    pub transaction_id: String,
    pub status: String,
    pub network: String,
    pub timestamp: String,
}

#[async_trait]
pub trait Wallet: Send + Sync {
    /// On-chain address that receives subsidies by default.
    fn farmer_address(&self) -> &str;

    /// Locator of the farmer's wallet.
    fn farmer_wallet(&self) -> &str;

    async fn balance(&self, wallet_id: &str) -> Sourced<Balance>;

    /// Recent activity of the farmer's wallet, or the treasury's when the
    /// farmer has none.
    async fn activity(&self) -> Sourced<Vec<serde_json::Value>>;

    /// Move USDC from the treasury. Rejects non-positive amounts; a refused
    /// transfer yields a simulated receipt.
    async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<Sourced<TransferReceipt>, WalletError>;
}
