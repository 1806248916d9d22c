//! Paper-trading client for the Alpaca REST API.
//!
//! Authenticates with the `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY` header
//! pair. Trading calls go to the paper trading host, quotes to the market
//! data host.

use crate::Brokerage;
use crate::types::*;
use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use tidewater_config::BrokerageConfig;
use tidewater_core::error::BrokerageError;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, BrokerageError>;

// Values interpolated into URL paths must stay a single segment.
static ORDER_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());
static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9.]+$").unwrap());

fn checked_order_id(order_id: &str) -> Result<&str> {
    let order_id = order_id.trim();
    if ORDER_ID_RE.is_match(order_id) {
        Ok(order_id)
    } else {
        Err(BrokerageError::InvalidOrder(format!("malformed order id '{order_id}'")))
    }
}

fn checked_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    // ".." alone would still match the character class.
    if SYMBOL_RE.is_match(&symbol) && symbol.chars().any(|c| c.is_ascii_alphanumeric()) {
        Ok(symbol)
    } else {
        Err(BrokerageError::InvalidOrder(format!("malformed symbol '{symbol}'")))
    }
}

pub struct AlpacaClient {
    trading_url: String,
    data_url: String,
    api_key: Option<String>,
    secret_key: Option<String>,
    client: reqwest::Client,
}

impl AlpacaClient {
    pub fn new(config: &BrokerageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            trading_url: config.trading_url.trim_end_matches('/').to_string(),
            data_url: config.data_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.secret_key.is_some()
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match (&self.api_key, &self.secret_key) {
            (Some(key), Some(secret)) => Ok(builder
                .header("APCA-API-KEY-ID", key)
                .header("APCA-API-SECRET-KEY", secret)),
            _ => Err(BrokerageError::NotConfigured(
                "ALPACA_API_KEY and ALPACA_SECRET_KEY must be set".into(),
            )),
        }
    }

    /// Send a request, mapping transport failures and non-2xx statuses.
    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|e| BrokerageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Brokerage API error");
            return Err(BrokerageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| BrokerageError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Brokerage for AlpacaClient {
    async fn account(&self) -> Result<Account> {
        let account: Account = self
            .get_json(&format!("{}/v2/account", self.trading_url))
            .await?;
        debug!(account_id = %account.id, equity = account.equity, "Fetched account");
        Ok(account)
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        let raw: Vec<RawPosition> = self
            .get_json(&format!("{}/v2/positions", self.trading_url))
            .await?;
        debug!(count = raw.len(), "Fetched positions");
        Ok(raw.into_iter().map(Position::from).collect())
    }

    async fn orders(&self, status: OrderStatusFilter, limit: u32) -> Result<Vec<Order>> {
        let url = format!(
            "{}/v2/orders?status={}&limit={}",
            self.trading_url,
            status.as_str(),
            limit
        );
        let orders: Vec<Order> = self.get_json(&url).await?;
        debug!(count = orders.len(), status = status.as_str(), "Fetched orders");
        Ok(orders)
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<Order> {
        let client_order_id = format!("water_futures_{}", chrono::Utc::now().timestamp_millis());
        let body = request
            .to_wire(&client_order_id)
            .map_err(BrokerageError::InvalidOrder)?;

        info!(
            symbol = %body["symbol"],
            qty = %body["qty"],
            side = %body["side"],
            "Placing order"
        );

        let response = self
            .send(
                self.client
                    .post(format!("{}/v2/orders", self.trading_url))
                    .json(&body),
            )
            .await?;

        let order: Order = response
            .json()
            .await
            .map_err(|e| BrokerageError::Decode(e.to_string()))?;
        info!(order_id = %order.id, status = %order.status, "Order placed");
        Ok(order)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let order_id = checked_order_id(order_id)?;
        let request = self
            .client
            .delete(format!("{}/v2/orders/{}", self.trading_url, order_id));
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| BrokerageError::Network(e.to_string()))?;

        let cancelled = response.status().is_success();
        info!(order_id, cancelled, "Cancel order");
        Ok(cancelled)
    }

    async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
        let symbol = checked_symbol(symbol)?;
        let url = format!("{}/v2/stocks/{}/quotes/latest", self.data_url, symbol);
        let payload: serde_json::Value = self.get_json(&url).await?;
        Ok(Quote::from_payload(&symbol, &payload))
    }
}
