//! Shared prompt context: the latest known brokerage, wallet and forecast
//! state, merged from partial fragments and rendered into the assistant's
//! system prompt.
//!
//! Route handlers and tools push whatever they just fetched into the
//! [`ContextStore`]; the assistant loop calls [`ContextStore::render_for_prompt`]
//! when it builds a request. The data is presentational only: the brokerage
//! and wallet APIs stay authoritative, so there is no versioning and
//! concurrent writers simply resolve per field in completion order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Rendered in place of any scalar field that has not been supplied yet.
pub const PLACEHOLDER: &str = "Loading...";

/// Brokerage view: account record, positions, orders, market conditions.
///
/// The same type is used as the update fragment. Every member is optional
/// and only the members that are `Some` overwrite stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerageSection {
    #[serde(default, alias = "accountInfo", skip_serializing_if = "Option::is_none")]
    pub account_info: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Value>>,

    #[serde(default, alias = "marketConditions", skip_serializing_if = "Option::is_none")]
    pub market_conditions: Option<Value>,
}

/// Custodial wallet view: USDC balance, recent activity, address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Vec<Value>>,

    #[serde(default, alias = "walletAddress", skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Water-futures market view: recommendations, market data, weather alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Value>>,

    #[serde(default, alias = "marketData", skip_serializing_if = "Option::is_none")]
    pub market_data: Option<Value>,

    #[serde(default, alias = "weatherAlerts", skip_serializing_if = "Option::is_none")]
    pub weather_alerts: Option<Vec<Value>>,
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

impl BrokerageSection {
    /// Shallow merge: fields present in `fragment` win, the rest are kept.
    pub fn merge(&mut self, fragment: BrokerageSection) {
        overwrite(&mut self.account_info, fragment.account_info);
        overwrite(&mut self.positions, fragment.positions);
        overwrite(&mut self.orders, fragment.orders);
        overwrite(&mut self.market_conditions, fragment.market_conditions);
    }
}

impl WalletSection {
    /// Shallow merge: fields present in `fragment` win, the rest are kept.
    pub fn merge(&mut self, fragment: WalletSection) {
        overwrite(&mut self.balance, fragment.balance);
        overwrite(&mut self.activity, fragment.activity);
        overwrite(&mut self.wallet_address, fragment.wallet_address);
    }
}

impl ForecastSection {
    /// Shallow merge: fields present in `fragment` win, the rest are kept.
    pub fn merge(&mut self, fragment: ForecastSection) {
        overwrite(&mut self.recommendations, fragment.recommendations);
        overwrite(&mut self.market_data, fragment.market_data);
        overwrite(&mut self.weather_alerts, fragment.weather_alerts);
    }
}

/// The complete in-memory state of all three sections.
///
/// A section stays `None` until the first fragment for it arrives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brokerage: Option<BrokerageSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastSection>,
}

impl ContextSnapshot {
    /// Render the fixed-format summary block used in assistant prompts.
    ///
    /// Every label is always present. Scalars that were never supplied show
    /// [`PLACEHOLDER`]; sequences that were never supplied count as zero.
    pub fn render(&self) -> String {
        let brokerage = self.brokerage.as_ref();
        let account = brokerage.and_then(|b| b.account_info.as_ref());
        let wallet = self.wallet.as_ref();
        let forecast = self.forecast.as_ref();

        let equity = scalar(account.and_then(|a| a.get("equity")));
        let buying_power = scalar(account.and_then(|a| a.get("buying_power")));
        let positions = count(brokerage.and_then(|b| b.positions.as_ref()));
        let orders = count(brokerage.and_then(|b| b.orders.as_ref()));

        let balance = wallet
            .and_then(|w| w.balance)
            .map(|b| b.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let address = wallet
            .and_then(|w| w.wallet_address.as_deref())
            .filter(|a| !a.is_empty())
            .unwrap_or(PLACEHOLDER);
        let activity = count(wallet.and_then(|w| w.activity.as_ref()));

        let recommendations = count(forecast.and_then(|f| f.recommendations.as_ref()));
        let alerts = count(forecast.and_then(|f| f.weather_alerts.as_ref()));

        format!(
            "Current Water Futures AI Context:

Brokerage Trading:
- Account Equity: {equity}
- Buying Power: {buying_power}
- Active Positions: {positions}
- Recent Orders: {orders}

Blockchain Wallet:
- USDC Balance: {balance} USDC
- Wallet: {address}
- Recent Transactions: {activity}

Water Futures Market:
- Active Recommendations: {recommendations}
- Weather Alerts: {alerts}

You are an AI assistant specialized in water futures trading, blockchain subsidies, and market analysis. \
Use this context to provide informed responses about the user's current positions, market conditions, and trading opportunities."
        )
    }
}

/// Display a JSON scalar without quotes; null or empty text is a placeholder.
fn scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => PLACEHOLDER.to_string(),
        Some(Value::String(s)) if s.is_empty() => PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn count(items: Option<&Vec<Value>>) -> usize {
    items.map_or(0, Vec::len)
}

static GLOBAL: OnceLock<ContextStore> = OnceLock::new();

/// Handle to a shared [`ContextSnapshot`].
///
/// Cloning is cheap and every clone sees the same snapshot. The composition
/// root creates one store and hands clones to handlers, tools and the
/// assistant; tests build their own with [`ContextStore::new`].
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    inner: Arc<RwLock<ContextSnapshot>>,
}

impl ContextStore {
    /// Create an empty, independent store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store, created on first call.
    pub fn global() -> &'static ContextStore {
        GLOBAL.get_or_init(|| {
            debug!("Initializing process-wide context store");
            ContextStore::new()
        })
    }

    /// Whether two handles point at the same underlying snapshot.
    pub fn shares_state_with(&self, other: &ContextStore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn update_brokerage(&self, fragment: BrokerageSection) {
        let mut snapshot = self.write();
        snapshot
            .brokerage
            .get_or_insert_with(BrokerageSection::default)
            .merge(fragment);
        debug!("Brokerage context updated");
    }

    pub fn update_wallet(&self, fragment: WalletSection) {
        let mut snapshot = self.write();
        snapshot
            .wallet
            .get_or_insert_with(WalletSection::default)
            .merge(fragment);
        debug!("Wallet context updated");
    }

    pub fn update_forecast(&self, fragment: ForecastSection) {
        let mut snapshot = self.write();
        snapshot
            .forecast
            .get_or_insert_with(ForecastSection::default)
            .merge(fragment);
        debug!("Forecast context updated");
    }

    /// A copy of the current merged state.
    pub fn snapshot(&self) -> ContextSnapshot {
        self.read().clone()
    }

    /// Render the current state for inclusion in an assistant prompt.
    pub fn render_for_prompt(&self) -> String {
        self.read().render()
    }

    // Poisoning only means a writer panicked mid-merge; the snapshot is
    // still a valid value, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, ContextSnapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextSnapshot> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
