//! Brokerage tools: account, positions, orders and quotes.
//!
//! Every read the assistant makes is also pushed into the shared context so
//! the next prompt (and the dashboard) sees the same numbers.

use crate::{execution_failed, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tidewater_brokerage::{Brokerage, OrderRequest, OrderSide, OrderStatusFilter, OrderType};
use tidewater_core::error::ToolError;
use tidewater_core::tool::{Tool, ToolResult};
use tidewater_core::{BrokerageSection, ContextStore};
use tracing::{info, warn};

fn to_values<T: serde::Serialize>(items: &[T]) -> Vec<serde_json::Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

pub struct GetAccountInfoTool {
    brokerage: Arc<dyn Brokerage>,
    context: ContextStore,
}

impl GetAccountInfoTool {
    pub fn new(brokerage: Arc<dyn Brokerage>, context: ContextStore) -> Self {
        Self { brokerage, context }
    }
}

#[async_trait]
impl Tool for GetAccountInfoTool {
    fn name(&self) -> &str {
        "get_account_info"
    }

    fn description(&self) -> &str {
        "Get current Alpaca account balance, buying power, and portfolio value"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let account = self
            .brokerage
            .account()
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        self.context.update_brokerage(BrokerageSection {
            account_info: serde_json::to_value(&account).ok(),
            ..Default::default()
        });

        Ok(ToolResult::json(json!({
            "account_id": account.id,
            "cash": account.cash,
            "portfolio_value": account.portfolio_value,
            "buying_power": account.buying_power,
            "equity": account.equity,
            "status": account.status,
            "pattern_day_trader": account.pattern_day_trader,
        })))
    }
}

pub struct GetPositionsTool {
    brokerage: Arc<dyn Brokerage>,
    context: ContextStore,
}

impl GetPositionsTool {
    pub fn new(brokerage: Arc<dyn Brokerage>, context: ContextStore) -> Self {
        Self { brokerage, context }
    }
}

#[async_trait]
impl Tool for GetPositionsTool {
    fn name(&self) -> &str {
        "get_positions"
    }

    fn description(&self) -> &str {
        "Get all current positions in your Alpaca account"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let positions = self
            .brokerage
            .positions()
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        let values = to_values(&positions);
        self.context.update_brokerage(BrokerageSection {
            positions: Some(values.clone()),
            ..Default::default()
        });

        Ok(ToolResult::json(serde_json::Value::Array(values)))
    }
}

#[derive(Debug, Deserialize)]
struct PlaceOrderArgs {
    symbol: String,
    side: OrderSide,
    quantity: f64,
    #[serde(default)]
    order_type: OrderType,
    #[serde(default)]
    limit_price: Option<f64>,
}

pub struct PlaceStockOrderTool {
    brokerage: Arc<dyn Brokerage>,
    context: ContextStore,
    /// How many recent orders to pull into context after placing one
    recent_orders: u32,
}

impl PlaceStockOrderTool {
    pub fn new(brokerage: Arc<dyn Brokerage>, context: ContextStore, recent_orders: u32) -> Self {
        Self {
            brokerage,
            context,
            recent_orders,
        }
    }
}

#[async_trait]
impl Tool for PlaceStockOrderTool {
    fn name(&self) -> &str {
        "place_stock_order"
    }

    fn description(&self) -> &str {
        "Place a stock order (buy or sell) on Alpaca. Use this when user wants to buy/sell stocks."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., TSLA for Tesla, AAPL for Apple)"
                },
                "side": {
                    "type": "string",
                    "enum": ["buy", "sell"],
                    "description": "Order side: buy or sell"
                },
                "quantity": {
                    "type": "number",
                    "exclusiveMinimum": 0,
                    "description": "Number of shares to buy/sell"
                },
                "order_type": {
                    "type": "string",
                    "enum": ["market", "limit"],
                    "default": "market",
                    "description": "Order type"
                },
                "limit_price": {
                    "type": "number",
                    "description": "Limit price (only for limit orders)"
                }
            },
            "required": ["symbol", "side", "quantity"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: PlaceOrderArgs = parse_args(arguments)?;
        if args.quantity.is_nan() || args.quantity <= 0.0 {
            return Err(ToolError::InvalidArguments("'quantity' must be positive".into()));
        }

        let request = OrderRequest {
            symbol: args.symbol,
            qty: args.quantity,
            side: args.side,
            order_type: args.order_type,
            time_in_force: None,
            limit_price: args.limit_price,
        };

        let order = self
            .brokerage
            .place_order(&request)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;
        info!(order_id = %order.id, symbol = %order.symbol, "Order placed by assistant");

        match self
            .brokerage
            .orders(OrderStatusFilter::All, self.recent_orders)
            .await
        {
            Ok(orders) => self.context.update_brokerage(BrokerageSection {
                orders: Some(to_values(&orders)),
                ..Default::default()
            }),
            Err(e) => warn!(error = %e, "Could not refresh recent orders"),
        }

        Ok(ToolResult::json(json!({
            "success": true,
            "order_id": order.id,
            "symbol": order.symbol,
            "side": order.side,
            "qty": order.qty,
            "type": order.order_type,
            "status": order.status,
            "submitted_at": order.submitted_at,
        })))
    }
}

#[derive(Debug, Deserialize)]
struct SymbolArgs {
    symbol: String,
}

pub struct GetStockQuoteTool {
    brokerage: Arc<dyn Brokerage>,
}

impl GetStockQuoteTool {
    pub fn new(brokerage: Arc<dyn Brokerage>) -> Self {
        Self { brokerage }
    }
}

#[async_trait]
impl Tool for GetStockQuoteTool {
    fn name(&self) -> &str {
        "get_stock_quote"
    }

    fn description(&self) -> &str {
        "Get real-time quote for a stock symbol"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., TSLA, AAPL)"
                }
            },
            "required": ["symbol"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SymbolArgs = parse_args(arguments)?;
        let quote = self
            .brokerage
            .latest_quote(&args.symbol)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        Ok(ToolResult::json(
            serde_json::to_value(&quote).map_err(|e| execution_failed(self.name(), e))?,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct OrdersArgs {
    #[serde(default)]
    status: OrderStatusFilter,
    #[serde(default = "default_orders_limit")]
    limit: u32,
}

fn default_orders_limit() -> u32 {
    10
}

pub struct GetOrdersTool {
    brokerage: Arc<dyn Brokerage>,
    context: ContextStore,
}

impl GetOrdersTool {
    pub fn new(brokerage: Arc<dyn Brokerage>, context: ContextStore) -> Self {
        Self { brokerage, context }
    }
}

#[async_trait]
impl Tool for GetOrdersTool {
    fn name(&self) -> &str {
        "get_orders"
    }

    fn description(&self) -> &str {
        "Get order history from Alpaca"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["all", "open", "closed"],
                    "default": "all",
                    "description": "Order status filter"
                },
                "limit": {
                    "type": "number",
                    "default": 10,
                    "description": "Number of orders to fetch"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: OrdersArgs = parse_args(arguments)?;
        let orders = self
            .brokerage
            .orders(args.status, args.limit)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        let values = to_values(&orders);
        self.context.update_brokerage(BrokerageSection {
            orders: Some(values.clone()),
            ..Default::default()
        });

        Ok(ToolResult::json(serde_json::Value::Array(values)))
    }
}

#[derive(Debug, Deserialize)]
struct CancelArgs {
    order_id: String,
}

pub struct CancelOrderTool {
    brokerage: Arc<dyn Brokerage>,
}

impl CancelOrderTool {
    pub fn new(brokerage: Arc<dyn Brokerage>) -> Self {
        Self { brokerage }
    }
}

#[async_trait]
impl Tool for CancelOrderTool {
    fn name(&self) -> &str {
        "cancel_order"
    }

    fn description(&self) -> &str {
        "Cancel an open order on Alpaca"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "order_id": {
                    "type": "string",
                    "description": "Order ID to cancel"
                }
            },
            "required": ["order_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: CancelArgs = parse_args(arguments)?;
        let cancelled = self
            .brokerage
            .cancel_order(&args.order_id)
            .await
            .map_err(|e| execution_failed(self.name(), e))?;

        let message = if cancelled {
            "Order cancelled"
        } else {
            "Failed to cancel order"
        };
        Ok(ToolResult::json(json!({
            "success": cancelled,
            "message": message,
        })))
    }
}
