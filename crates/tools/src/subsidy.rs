//! Drought subsidy tools.

use crate::{execution_failed, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tidewater_core::error::{ToolError, WalletError};
use tidewater_core::tool::{Tool, ToolResult};
use tidewater_core::{ContextStore, WalletSection};
use tidewater_wallet::{DroughtMonitor, TransferRequest, Wallet};
use tracing::info;

#[derive(Debug, Deserialize)]
struct DroughtArgs {
    #[serde(default)]
    region: Option<String>,
}

pub struct CheckDroughtConditionsTool {
    monitor: Arc<DroughtMonitor>,
}

impl CheckDroughtConditionsTool {
    pub fn new(monitor: Arc<DroughtMonitor>) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl Tool for CheckDroughtConditionsTool {
    fn name(&self) -> &str {
        "check_drought_conditions"
    }

    fn description(&self) -> &str {
        "Check current drought conditions and subsidy eligibility"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "region": {
                    "type": "string",
                    "default": "California",
                    "description": "Geographic region"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: DroughtArgs = parse_args(arguments)?;
        let assessment = self.monitor.assess(args.region.as_deref());
        info!(
            region = %assessment.region,
            index = assessment.drought_index,
            eligible = assessment.eligible,
            "Drought conditions checked"
        );

        Ok(ToolResult::json(
            serde_json::to_value(&assessment).map_err(|e| execution_failed(self.name(), e))?,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TransferArgs {
    amount: f64,
    #[serde(default)]
    recipient: Option<String>,
}

pub struct ExecuteSubsidyTransferTool {
    wallet: Arc<dyn Wallet>,
    context: ContextStore,
}

impl ExecuteSubsidyTransferTool {
    pub fn new(wallet: Arc<dyn Wallet>, context: ContextStore) -> Self {
        Self { wallet, context }
    }
}

#[async_trait]
impl Tool for ExecuteSubsidyTransferTool {
    fn name(&self) -> &str {
        "execute_subsidy_transfer"
    }

    fn description(&self) -> &str {
        "Execute USDC subsidy transfer from Uncle Sam to eligible farmer"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "exclusiveMinimum": 0,
                    "description": "Amount in USDC to transfer"
                },
                "recipient": {
                    "type": "string",
                    "description": "Recipient wallet (default: Farmer Ted)"
                }
            },
            "required": ["amount"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: TransferArgs = parse_args(arguments)?;
        let request = TransferRequest {
            amount: args.amount,
            recipient: args.recipient,
        };

        let receipt = self.wallet.transfer(&request).await.map_err(|e| match e {
            WalletError::InvalidAmount(amount) => {
                ToolError::InvalidArguments(format!("'amount' must be positive, got {amount}"))
            }
            other => execution_failed(self.name(), other),
        })?;

        if receipt.is_live() {
            self.context.update_wallet(WalletSection {
                activity: Some(vec![json!({
                    "type": "subsidy_transfer",
                    "amount": request.amount,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })]),
                ..Default::default()
            });
        }

        let note = receipt.reason().map(|r| format!("Simulated transfer: {r}"));
        let mut output =
            serde_json::to_value(receipt.data()).map_err(|e| execution_failed(self.name(), e))?;
        if let Some(note) = note {
            output["note"] = json!(note);
        }

        Ok(ToolResult::json(output))
    }
}
