//! Water-futures outlook and model-written market analysis.

use crate::{SharedState, sourced_json};
use axum::extract::State;
use axum::response::Json;
use tidewater_forecast::MarketOutlook;
use tracing::{debug, warn};

/// Current outlook; also seeds the forecast section of the shared context.
pub(crate) async fn outlook_handler(State(state): State<SharedState>) -> Json<MarketOutlook> {
    let outlook = MarketOutlook::current();
    state.context.update_forecast(outlook.to_fragment());
    debug!(
        recommendations = outlook.recommendations.len(),
        alerts = outlook.weather_alerts.len(),
        "Forecast context seeded"
    );
    Json(outlook)
}

pub(crate) async fn analysis_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let analysis = state.analyst.analyze().await;
    if let Some(reason) = analysis.reason() {
        warn!(reason, "Serving fallback market analysis");
    }
    Json(sourced_json(&analysis))
}

#[cfg(test)]
mod tests {
    use crate::testing::{FixedProvider, Harness};
    use axum::http::StatusCode;
    use tidewater_core::error::ProviderError;
    use tidewater_tools::mock::{MockBrokerage, MockWallet};

    #[tokio::test]
    async fn outlook_seeds_forecast_context() {
        let harness = Harness::replying("");
        let (status, body) = harness.get("/api/forecast").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
        assert_eq!(body["weather_alerts"].as_array().unwrap().len(), 3);

        let prompt = harness.state.context.render_for_prompt();
        assert!(prompt.contains("Active Recommendations: 3"));
        assert!(prompt.contains("Weather Alerts: 3"));
    }

    #[tokio::test]
    async fn analysis_carries_model_insights() {
        let harness = Harness::replying("Snowpack is below normal.");
        let (status, body) = harness.get("/api/forecast/analysis").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["key_insights"], "Snowpack is below normal.");
        assert_eq!(body["source"], "live");
        assert_eq!(body["risk_factors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn analysis_falls_back_without_model() {
        let harness = Harness::new(
            FixedProvider(Err(ProviderError::Network("connection refused".into()))),
            MockBrokerage::default(),
            MockWallet::default(),
        );
        let (status, body) = harness.get("/api/forecast/analysis").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert!(body["reason"].as_str().unwrap().contains("connection refused"));
    }
}
