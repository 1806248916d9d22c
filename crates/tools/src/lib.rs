//! Tools the Tidewater assistant can call.
//!
//! Six brokerage tools (account, positions, orders, quotes) and two
//! subsidy tools (drought check, USDC transfer). Each holds the client it
//! needs plus, where it learns something, the shared [`ContextStore`].

pub mod subsidy;
pub mod trading;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use subsidy::{CheckDroughtConditionsTool, ExecuteSubsidyTransferTool};
pub use trading::{
    CancelOrderTool, GetAccountInfoTool, GetOrdersTool, GetPositionsTool, GetStockQuoteTool,
    PlaceStockOrderTool,
};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tidewater_brokerage::Brokerage;
use tidewater_core::ContextStore;
use tidewater_core::error::ToolError;
use tidewater_core::tool::ToolRegistry;
use tidewater_wallet::{DroughtMonitor, Wallet};

/// Build the registry with all eight trading and subsidy tools.
pub fn trading_registry(
    brokerage: Arc<dyn Brokerage>,
    wallet: Arc<dyn Wallet>,
    drought: Arc<DroughtMonitor>,
    context: ContextStore,
    recent_orders: u32,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(GetAccountInfoTool::new(
        brokerage.clone(),
        context.clone(),
    )));
    registry.register(Box::new(GetPositionsTool::new(
        brokerage.clone(),
        context.clone(),
    )));
    registry.register(Box::new(PlaceStockOrderTool::new(
        brokerage.clone(),
        context.clone(),
        recent_orders,
    )));
    registry.register(Box::new(GetStockQuoteTool::new(brokerage.clone())));
    registry.register(Box::new(GetOrdersTool::new(brokerage.clone(), context.clone())));
    registry.register(Box::new(CancelOrderTool::new(brokerage)));
    registry.register(Box::new(CheckDroughtConditionsTool::new(drought)));
    registry.register(Box::new(ExecuteSubsidyTransferTool::new(wallet, context)));
    registry
}

pub(crate) fn parse_args<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T, ToolError> {
    // Models sometimes send `null` for tools without parameters.
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

pub(crate) fn execution_failed(tool_name: &str, reason: impl std::fmt::Display) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: reason.to_string(),
    }
}
