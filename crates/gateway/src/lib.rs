//! HTTP API gateway for Tidewater.
//!
//! Serves the dashboard and chat widget: assistant chat, brokerage and
//! wallet proxies, the water-futures outlook, and read/write access to the
//! shared context the assistant prompts are built from.
//!
//! Built on Axum; every endpoint speaks JSON.

pub mod chat;
pub mod context;
pub mod market;
pub mod trading;
pub mod wallet;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use tidewater_agent::{AssistantLoop, SimpleAssistant};
use tidewater_brokerage::{AlpacaClient, Brokerage};
use tidewater_config::AppConfig;
use tidewater_core::{ContextStore, Provider};
use tidewater_forecast::MarketAnalyst;
use tidewater_wallet::{CrossmintClient, DroughtMonitor, Wallet};

/// Request bodies above this size are rejected.
const BODY_LIMIT: usize = 1024 * 1024;

/// Everything a handler may need, built once at startup.
pub struct GatewayState {
    pub config: AppConfig,
    pub context: ContextStore,
    pub brokerage: Arc<dyn Brokerage>,
    pub wallet: Arc<dyn Wallet>,
    pub assistant: AssistantLoop,
    pub simple: SimpleAssistant,
    pub analyst: MarketAnalyst,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Wire the assistant, keyword assistant and analyst around the given
    /// collaborators. All of them share `context`.
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn Provider>,
        brokerage: Arc<dyn Brokerage>,
        wallet: Arc<dyn Wallet>,
        drought: Arc<DroughtMonitor>,
        context: ContextStore,
    ) -> Self {
        let tools = Arc::new(tidewater_tools::trading_registry(
            brokerage.clone(),
            wallet.clone(),
            drought,
            context.clone(),
            config.brokerage.recent_orders,
        ));
        let assistant =
            AssistantLoop::from_config(&config.assistant, provider.clone(), tools, context.clone());
        let simple = SimpleAssistant::new(provider.clone(), &config.assistant.model, brokerage.clone());
        let analyst = MarketAnalyst::new(provider, &config.assistant.model);

        Self {
            config,
            context,
            brokerage,
            wallet,
            assistant,
            simple,
            analyst,
        }
    }

    /// Real HTTP clients and the process-wide context store.
    pub fn from_config(config: AppConfig) -> Self {
        let provider = tidewater_providers::from_config_or_unavailable(&config.assistant);
        let brokerage = Arc::new(AlpacaClient::new(&config.brokerage));
        let wallet = Arc::new(CrossmintClient::new(&config.wallet));
        let drought = Arc::new(DroughtMonitor::new(&config.subsidy));
        let context = ContextStore::global().clone();
        Self::new(config, provider, brokerage, wallet, drought, context)
    }
}

/// Build the router with every API route.
///
/// Layers applied:
/// - CORS for the configured dashboard origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.allowed_origin);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/chat-simple", post(chat::chat_simple_handler))
        .route("/api/brokerage/account", get(trading::account_handler))
        .route("/api/brokerage/positions", get(trading::positions_handler))
        .route(
            "/api/brokerage/orders",
            get(trading::orders_handler).post(trading::place_order_handler),
        )
        .route("/api/wallet/balance", get(wallet::balance_handler))
        .route("/api/wallet/activity", get(wallet::activity_handler))
        .route("/api/wallet/transfer", post(wallet::transfer_handler))
        .route("/api/forecast", get(market::outlook_handler))
        .route("/api/forecast/analysis", get(market::analysis_handler))
        .route("/api/context", get(context::snapshot_handler))
        .route("/api/context/prompt", get(context::prompt_handler))
        .route("/api/context/{section}", post(context::update_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(origin = %allowed_origin, "Invalid CORS origin; cross-origin requests disabled");
            cors
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    for missing in config.missing_credentials() {
        warn!(credential = missing, "Credential not set; related endpoints will fail or degrade");
    }

    let state = Arc::new(GatewayState::from_config(config));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Shared response types ---

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Flatten a [`tidewater_core::Sourced`] object into its data plus a
/// `source` marker (and the fallback `reason`, if any).
pub(crate) fn sourced_json<T: Serialize>(sourced: &tidewater_core::Sourced<T>) -> serde_json::Value {
    let mut value = serde_json::to_value(sourced.data()).unwrap_or_default();
    if let Some(object) = value.as_object_mut() {
        let source = if sourced.is_live() { "live" } else { "fallback" };
        object.insert("source".into(), source.into());
        if let Some(reason) = sourced.reason() {
            object.insert("reason".into(), reason.into());
        }
    }
    value
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tidewater_core::Sourced;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = Harness::replying("hi").get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let harness = Harness::replying("hi");
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = build_router(harness.state.clone()).oneshot(req).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let harness = Harness::replying("hi");
        let message = "x".repeat(BODY_LIMIT + 1);
        let (status, _) = harness
            .post("/api/chat", serde_json::json!({ "message": message }))
            .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn sourced_json_marks_fallbacks() {
        let live = sourced_json(&Sourced::live(serde_json::json!({"usdc_balance": 5.0})));
        assert_eq!(live["source"], "live");
        assert!(live.get("reason").is_none());

        let fallback = sourced_json(&Sourced::fallback(
            serde_json::json!({"usdc_balance": 10000.0}),
            "wallet service offline",
        ));
        assert_eq!(fallback["source"], "fallback");
        assert_eq!(fallback["reason"], "wallet service offline");
        assert_eq!(fallback["usdc_balance"], 10000.0);
    }
}
