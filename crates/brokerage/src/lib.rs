//! Paper-trading brokerage for Tidewater.
//!
//! The [`Brokerage`] trait is what tools, the gateway and the assistant
//! depend on; [`AlpacaClient`] is the HTTP implementation.

pub mod alpaca;
pub mod command;
pub mod types;

pub use alpaca::AlpacaClient;
pub use command::{TradeCommand, parse_trade_command};
pub use types::{
    Account, Order, OrderRequest, OrderSide, OrderStatusFilter, OrderType, Position, PositionSide,
    Quote,
};

use async_trait::async_trait;
use tidewater_core::error::BrokerageError;

#[async_trait]
pub trait Brokerage: Send + Sync {
    async fn account(&self) -> Result<Account, BrokerageError>;

    async fn positions(&self) -> Result<Vec<Position>, BrokerageError>;

    async fn orders(
        &self,
        status: OrderStatusFilter,
        limit: u32,
    ) -> Result<Vec<Order>, BrokerageError>;

    async fn place_order(&self, request: &OrderRequest) -> Result<Order, BrokerageError>;

    /// Returns whether the brokerage accepted the cancellation.
    async fn cancel_order(&self, order_id: &str) -> Result<bool, BrokerageError>;

    async fn latest_quote(&self, symbol: &str) -> Result<Quote, BrokerageError>;
}
