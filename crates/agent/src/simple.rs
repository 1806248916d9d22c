//! Keyword assistant: no tool calling, just pattern-matched actions.

use crate::prompt::SIMPLE_INSTRUCTIONS;
use std::sync::Arc;
use tidewater_brokerage::{Account, Brokerage, Order, OrderRequest, OrderSide, parse_trade_command};
use tidewater_core::{Provider, ProviderRequest};
use tracing::{info, warn};

/// Reply used when the model cannot be reached or returns nothing.
pub const HELP_TEXT: &str =
    "I can help you buy stocks. Try saying \"buy 1 tesla\" or \"check my balance\".";

const SIMPLE_MAX_TOKENS: u32 = 500;

pub struct SimpleAssistant {
    provider: Arc<dyn Provider>,
    model: String,
    brokerage: Arc<dyn Brokerage>,
}

impl SimpleAssistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        brokerage: Arc<dyn Brokerage>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            brokerage,
        }
    }

    /// Always produces a reply; failures are described in the text.
    pub async fn respond(&self, message: &str) -> String {
        if let Some(command) = parse_trade_command(message) {
            info!(symbol = %command.symbol, quantity = command.quantity, "Keyword buy command");
            let request =
                OrderRequest::market(&command.symbol, f64::from(command.quantity), OrderSide::Buy);
            return match self.brokerage.place_order(&request).await {
                Ok(order) => order_placed(&order),
                Err(e) => {
                    warn!(symbol = %command.symbol, error = %e, "Keyword order failed");
                    format!(
                        "Failed to place order: {e}\n\nPlease check that the symbol is valid and try again."
                    )
                }
            };
        }

        let lower = message.to_lowercase();
        if lower.contains("balance") || lower.contains("account") {
            return match self.brokerage.account().await {
                Ok(account) => account_summary(&account),
                Err(e) => format!("Failed to fetch account information: {e}"),
            };
        }

        let request =
            ProviderRequest::single_turn(&self.model, SIMPLE_INSTRUCTIONS, message, SIMPLE_MAX_TOKENS);
        match self.provider.complete(request).await {
            Ok(response) if !response.message.content.trim().is_empty() => response.message.content,
            Ok(_) => HELP_TEXT.to_string(),
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Simple completion failed");
                HELP_TEXT.to_string()
            }
        }
    }
}

fn order_placed(order: &Order) -> String {
    format!(
        "Order placed successfully!\n\n\
         **Order Details:**\n\
         - Symbol: {}\n\
         - Quantity: {} shares\n\
         - Type: Market Order\n\
         - Status: {}\n\
         - Order ID: {}\n\n\
         Note: The order is in \"{}\" status. It will be filled when the market opens.",
        order.symbol,
        order.qty.as_deref().unwrap_or("?"),
        order.status,
        order.id,
        order.status,
    )
}

fn account_summary(account: &Account) -> String {
    format!(
        "**Account Information:**\n\n\
         - Cash Available: {}\n\
         - Buying Power: {}\n\
         - Portfolio Value: {}\n\
         - Account Status: {}",
        usd(account.cash),
        usd(account.buying_power),
        usd(account.portfolio_value),
        account.status,
    )
}

/// `$1,234.50` style dollar amounts.
fn usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
