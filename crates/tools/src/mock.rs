//! In-memory brokerage and wallet for tests.
//!
//! Enabled for this crate's own tests and, through the `mock` feature, for
//! the agent and gateway test suites.

use async_trait::async_trait;
use std::sync::Mutex;
use tidewater_brokerage::{
    Account, Brokerage, Order, OrderRequest, OrderStatusFilter, Position, PositionSide, Quote,
};
use tidewater_core::Sourced;
use tidewater_core::error::{BrokerageError, WalletError};
use tidewater_wallet::{Balance, TransferReceipt, TransferRequest, Wallet};

pub const FARMER_ADDRESS: &str = "0x639A356DB809fA45A367Bc71A6D766dF2e9C6D15";

/// Brokerage that fills every market order instantly.
pub struct MockBrokerage {
    pub account: Account,
    pub positions: Vec<Position>,
    pub orders: Mutex<Vec<Order>>,
    /// When set, every call fails with this error
    pub failure: Option<BrokerageError>,
}

impl Default for MockBrokerage {
    fn default() -> Self {
        Self {
            account: Account {
                id: "acc-test".into(),
                cash: 50000.0,
                portfolio_value: 100500.0,
                buying_power: 200000.0,
                equity: 100500.0,
                last_equity: 100000.0,
                multiplier: 2,
                currency: "USD".into(),
                status: "ACTIVE".into(),
                pattern_day_trader: false,
                trading_blocked: false,
                transfers_blocked: false,
                account_blocked: false,
                created_at: None,
            },
            positions: vec![Position {
                asset_id: None,
                symbol: "AWK".into(),
                exchange: "NYSE".into(),
                asset_class: Some("us_equity".into()),
                qty: "10".into(),
                side: PositionSide::Long,
                market_value: Some("1312.00".into()),
                cost_basis: Some("1280.00".into()),
                unrealized_pl: Some("32.00".into()),
                unrealized_plpc: None,
                current_price: Some("131.20".into()),
                lastday_price: None,
                change_today: None,
                avg_entry_price: Some("128.00".into()),
                qty_available: "10".into(),
            }],
            orders: Mutex::new(Vec::new()),
            failure: None,
        }
    }
}

impl MockBrokerage {
    pub fn failing(error: BrokerageError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn placed(&self) -> Vec<Order> {
        self.orders.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), BrokerageError> {
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Brokerage for MockBrokerage {
    async fn account(&self) -> Result<Account, BrokerageError> {
        self.check()?;
        Ok(self.account.clone())
    }

    async fn positions(&self) -> Result<Vec<Position>, BrokerageError> {
        self.check()?;
        Ok(self.positions.clone())
    }

    async fn orders(
        &self,
        _status: OrderStatusFilter,
        limit: u32,
    ) -> Result<Vec<Order>, BrokerageError> {
        self.check()?;
        let orders = self.orders.lock().unwrap();
        Ok(orders.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order, BrokerageError> {
        self.check()?;
        let wire = request
            .to_wire("water_futures_test")
            .map_err(BrokerageError::InvalidOrder)?;

        let mut orders = self.orders.lock().unwrap();
        let order = Order {
            id: format!("order-{}", orders.len() + 1),
            client_order_id: Some("water_futures_test".into()),
            symbol: wire["symbol"].as_str().unwrap_or_default().to_string(),
            qty: wire["qty"].as_str().map(str::to_string),
            filled_qty: None,
            filled_avg_price: None,
            side: wire["side"].as_str().unwrap_or_default().to_string(),
            order_type: wire["type"].as_str().unwrap_or_default().to_string(),
            time_in_force: Some("day".into()),
            limit_price: request.limit_price.map(|p| p.to_string()),
            status: "accepted".into(),
            created_at: None,
            submitted_at: Some("2025-06-01T15:00:00Z".into()),
            filled_at: None,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<bool, BrokerageError> {
        self.check()?;
        let mut orders = self.orders.lock().unwrap();
        match orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.status = "canceled".into();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Quote, BrokerageError> {
        self.check()?;
        Ok(Quote {
            symbol: symbol.to_uppercase(),
            bid: 250.0,
            ask: 250.5,
            timestamp: "2025-06-01T15:00:00Z".into(),
        })
    }
}

/// Wallet with a fixed balance that records every transfer.
pub struct MockWallet {
    pub usdc_balance: f64,
    /// When false, reads and transfers come back as fallbacks
    pub live: bool,
    pub transfers: Mutex<Vec<TransferRequest>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            usdc_balance: 250.0,
            live: true,
            transfers: Mutex::new(Vec::new()),
        }
    }
}

impl MockWallet {
    pub fn offline() -> Self {
        Self {
            live: false,
            ..Default::default()
        }
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }

    fn sourced<T>(&self, data: T) -> Sourced<T> {
        if self.live {
            Sourced::live(data)
        } else {
            Sourced::fallback(data, "wallet service offline")
        }
    }
}

#[async_trait]
impl Wallet for MockWallet {
    fn farmer_address(&self) -> &str {
        FARMER_ADDRESS
    }

    fn farmer_wallet(&self) -> &str {
        "userId:farmerted:evm"
    }

    async fn balance(&self, wallet_id: &str) -> Sourced<Balance> {
        let usdc_balance = if self.live {
            self.usdc_balance
        } else {
            tidewater_wallet::FALLBACK_BALANCE
        };
        self.sourced(Balance {
            wallet_id: wallet_id.to_string(),
            usdc_balance,
            currency: "USDC".into(),
            network: "ethereum-sepolia".into(),
            timestamp: "2025-06-01T15:00:00Z".into(),
        })
    }

    async fn activity(&self) -> Sourced<Vec<serde_json::Value>> {
        let items = if self.live {
            vec![serde_json::json!({"id": "tx1", "type": "receive", "amount": "5"})]
        } else {
            Vec::new()
        };
        self.sourced(items)
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<Sourced<TransferReceipt>, WalletError> {
        if !(request.amount.is_finite() && request.amount > 0.0) {
            return Err(WalletError::InvalidAmount(request.amount));
        }
        self.transfers.lock().unwrap().push(request.clone());

        let recipient = request
            .recipient
            .clone()
            .unwrap_or_else(|| FARMER_ADDRESS.to_string());
        let (transaction_id, status) = if self.live {
            ("xfer_1".to_string(), "completed")
        } else {
            ("mock_tx_1".to_string(), "completed (simulated)")
        };

        Ok(self.sourced(TransferReceipt {
            success: true,
            amount: request.amount,
            currency: "USDC".into(),
            from: "Uncle Sam".into(),
            to: if recipient == FARMER_ADDRESS {
                "Farmer Ted".into()
            } else {
                recipient.clone()
            },
            recipient_address: recipient,
            transaction_id,
            status: status.into(),
            network: "ethereum-sepolia".into(),
            timestamp: "2025-06-01T15:00:00Z".into(),
        }))
    }
}
