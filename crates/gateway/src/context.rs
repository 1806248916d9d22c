//! Read and merge the shared assistant context.

use crate::{ApiError, SharedState, api_error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tidewater_core::{BrokerageSection, ContextSnapshot, ForecastSection, WalletSection};
use tracing::info;

pub(crate) async fn snapshot_handler(State(state): State<SharedState>) -> Json<ContextSnapshot> {
    Json(state.context.snapshot())
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

pub(crate) async fn prompt_handler(State(state): State<SharedState>) -> Json<PromptResponse> {
    Json(PromptResponse {
        prompt: state.context.render_for_prompt(),
    })
}

fn fragment<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid context fragment: {e}")))
}

/// Merge a fragment into one section; returns the merged snapshot.
pub(crate) async fn update_handler(
    State(state): State<SharedState>,
    Path(section): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ContextSnapshot>, ApiError> {
    match section.as_str() {
        "brokerage" => state.context.update_brokerage(fragment::<BrokerageSection>(body)?),
        "wallet" => state.context.update_wallet(fragment::<WalletSection>(body)?),
        "forecast" => state.context.update_forecast(fragment::<ForecastSection>(body)?),
        other => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Unknown context section '{other}'. Use brokerage, wallet, or forecast."),
            ));
        }
    }
    info!(section = %section, "Context fragment merged");
    Ok(Json(state.context.snapshot()))
}
