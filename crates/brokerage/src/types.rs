//! Brokerage domain types.
//!
//! The trading API reports most quantities as decimal strings; the
//! `numeric` deserializer accepts either form so callers get plain numbers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Deserialize a number that may arrive as a JSON number, a decimal
/// string, or null (→ default).
fn numeric<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Num(T),
        Text(String),
    }

    match Option::<Raw<T>>::deserialize(deserializer)? {
        None => Ok(T::default()),
        Some(Raw::Num(n)) => Ok(n),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(T::default()),
        Some(Raw::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Account summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(alias = "account_id")]
    pub id: String,

    #[serde(default, deserialize_with = "numeric")]
    pub cash: f64,

    #[serde(default, deserialize_with = "numeric")]
    pub portfolio_value: f64,

    #[serde(default, deserialize_with = "numeric")]
    pub buying_power: f64,

    #[serde(default, deserialize_with = "numeric")]
    pub equity: f64,

    #[serde(default, deserialize_with = "numeric")]
    pub last_equity: f64,

    #[serde(default, deserialize_with = "numeric")]
    pub multiplier: u32,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub pattern_day_trader: bool,

    #[serde(default)]
    pub trading_blocked: bool,

    #[serde(default)]
    pub transfers_blocked: bool,

    #[serde(default)]
    pub account_blocked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

/// An open position. Price fields stay as the decimal strings the API
/// sends so nothing is lost in display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub asset_id: Option<String>,
    pub symbol: String,
    pub exchange: String,
    pub asset_class: Option<String>,
    pub qty: String,
    pub side: PositionSide,
    pub market_value: Option<String>,
    pub cost_basis: Option<String>,
    pub unrealized_pl: Option<String>,
    pub unrealized_plpc: Option<String>,
    pub current_price: Option<String>,
    pub lastday_price: Option<String>,
    pub change_today: Option<String>,
    pub avg_entry_price: Option<String>,
    pub qty_available: String,
}

/// Position as the trading API returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPosition {
    asset_id: Option<String>,
    symbol: String,
    exchange: Option<String>,
    asset_class: Option<String>,
    #[serde(default)]
    qty: String,
    market_value: Option<String>,
    cost_basis: Option<String>,
    unrealized_pl: Option<String>,
    unrealized_plpc: Option<String>,
    current_price: Option<String>,
    lastday_price: Option<String>,
    change_today: Option<String>,
    avg_entry_price: Option<String>,
    qty_available: Option<String>,
}

impl From<RawPosition> for Position {
    fn from(raw: RawPosition) -> Self {
        let side = match raw.qty.trim().parse::<f64>() {
            Ok(q) if q > 0.0 => PositionSide::Long,
            _ => PositionSide::Short,
        };
        let qty_available = raw
            .qty_available
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| raw.qty.clone());

        Self {
            asset_id: raw.asset_id,
            symbol: raw.symbol,
            exchange: raw
                .exchange
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "ALPACA".into()),
            asset_class: raw.asset_class,
            qty: raw.qty,
            side,
            market_value: raw.market_value,
            cost_basis: raw.cost_basis,
            unrealized_pl: raw.unrealized_pl,
            unrealized_plpc: raw.unrealized_plpc,
            current_price: raw.current_price,
            lastday_price: raw.lastday_price,
            change_today: raw.change_today,
            avg_entry_price: raw.avg_entry_price,
            qty_available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

/// Order history filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl OrderStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// A new order as the assistant or the dashboard asks for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,

    #[serde(alias = "quantity")]
    pub qty: f64,

    pub side: OrderSide,

    #[serde(default, rename = "type", alias = "order_type")]
    pub order_type: OrderType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, qty: f64, side: OrderSide) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side,
            order_type: OrderType::Market,
            time_in_force: None,
            limit_price: None,
        }
    }

    /// Check the request and build the wire body sent to the trading API.
    pub fn to_wire(&self, client_order_id: &str) -> Result<serde_json::Value, String> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err("symbol is required".into());
        }
        if !(self.qty.is_finite() && self.qty > 0.0) {
            return Err(format!("quantity must be positive, got {}", self.qty));
        }

        let mut body = serde_json::json!({
            "symbol": symbol,
            "qty": self.qty.to_string(),
            "side": self.side,
            "type": self.order_type,
            "time_in_force": self.time_in_force.as_deref().unwrap_or("day"),
            "client_order_id": client_order_id,
        });

        if self.order_type == OrderType::Limit {
            match self.limit_price {
                Some(price) if price > 0.0 => body["limit_price"] = serde_json::json!(price),
                _ => return Err("limit orders need a positive limit_price".into()),
            }
        }

        Ok(body)
    }
}

/// An order as reported by the trading API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    #[serde(default)]
    pub client_order_id: Option<String>,

    pub symbol: String,

    #[serde(default)]
    pub qty: Option<String>,

    #[serde(default)]
    pub filled_qty: Option<String>,

    #[serde(default)]
    pub filled_avg_price: Option<String>,

    pub side: String,

    #[serde(rename = "type", default)]
    pub order_type: String,

    #[serde(default)]
    pub time_in_force: Option<String>,

    #[serde(default)]
    pub limit_price: Option<String>,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub submitted_at: Option<String>,

    #[serde(default)]
    pub filled_at: Option<String>,
}

/// Latest bid/ask for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub bid: f64,
    pub ask: f64,
    pub timestamp: String,
}

impl Quote {
    /// Build from the market data payload; missing fields → 0 / now.
    pub(crate) fn from_payload(symbol: &str, payload: &serde_json::Value) -> Self {
        let quote = &payload["quote"];
        Self {
            symbol: symbol.to_uppercase(),
            bid: quote["bp"].as_f64().unwrap_or(0.0),
            ask: quote["ap"].as_f64().unwrap_or(0.0),
            timestamp: quote["t"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_parses_decimal_strings() {
        let account: Account = serde_json::from_str(
            r#"{
                "id": "acc-1",
                "cash": "98000.25",
                "portfolio_value": "100500",
                "buying_power": "196000.5",
                "equity": "100500",
                "last_equity": "100000",
                "multiplier": "2",
                "currency": "USD",
                "status": "ACTIVE",
                "pattern_day_trader": false,
                "trading_blocked": false,
                "transfers_blocked": false,
                "account_blocked": false,
                "created_at": "2025-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(account.cash, 98000.25);
        assert_eq!(account.buying_power, 196000.5);
        assert_eq!(account.multiplier, 2);
        assert_eq!(account.status, "ACTIVE");
    }

    #[test]
    fn account_tolerates_missing_and_null_numbers() {
        let account: Account =
            serde_json::from_str(r#"{"id": "acc-2", "cash": null, "equity": 12.5}"#).unwrap();
        assert_eq!(account.cash, 0.0);
        assert_eq!(account.equity, 12.5);
        assert_eq!(account.multiplier, 0);
    }

    #[test]
    fn position_side_and_defaults_are_derived() {
        let raw: RawPosition = serde_json::from_str(
            r#"{"symbol": "TSLA", "qty": "3", "avg_entry_price": "250.10"}"#,
        )
        .unwrap();
        let position = Position::from(raw);
        assert_eq!(position.side, PositionSide::Long);
        assert_eq!(position.exchange, "ALPACA");
        assert_eq!(position.qty_available, "3");

        let raw: RawPosition =
            serde_json::from_str(r#"{"symbol": "AWK", "qty": "-2", "exchange": "NYSE"}"#).unwrap();
        let position = Position::from(raw);
        assert_eq!(position.side, PositionSide::Short);
        assert_eq!(position.exchange, "NYSE");
    }

    #[test]
    fn market_order_wire_body() {
        let request = OrderRequest::market("tsla", 1.0, OrderSide::Buy);
        let body = request.to_wire("water_futures_1").unwrap();
        assert_eq!(body["symbol"], "TSLA");
        assert_eq!(body["qty"], "1");
        assert_eq!(body["side"], "buy");
        assert_eq!(body["type"], "market");
        assert_eq!(body["time_in_force"], "day");
        assert_eq!(body["client_order_id"], "water_futures_1");
        assert!(body.get("limit_price").is_none());
    }

    #[test]
    fn limit_order_requires_price() {
        let mut request = OrderRequest::market("AWK", 2.0, OrderSide::Sell);
        request.order_type = OrderType::Limit;
        assert!(request.to_wire("x").is_err());

        request.limit_price = Some(131.5);
        let body = request.to_wire("x").unwrap();
        assert_eq!(body["type"], "limit");
        assert_eq!(body["limit_price"], 131.5);
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let request = OrderRequest::market("TSLA", 0.0, OrderSide::Buy);
        assert!(request.to_wire("x").is_err());
    }

    #[test]
    fn order_request_accepts_tool_argument_names() {
        let request: OrderRequest = serde_json::from_value(serde_json::json!({
            "symbol": "XYL",
            "side": "buy",
            "quantity": 5,
            "order_type": "limit",
            "limit_price": 120.0
        }))
        .unwrap();
        assert_eq!(request.qty, 5.0);
        assert_eq!(request.order_type, OrderType::Limit);
    }

    #[test]
    fn quote_defaults_when_fields_missing() {
        let quote = Quote::from_payload("tsla", &serde_json::json!({"quote": {"bp": 250.5}}));
        assert_eq!(quote.symbol, "TSLA");
        assert_eq!(quote.bid, 250.5);
        assert_eq!(quote.ask, 0.0);
        assert!(!quote.timestamp.is_empty());
    }
}
