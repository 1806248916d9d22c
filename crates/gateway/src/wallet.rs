//! Wallet endpoints: farmer balance, activity feed and subsidy transfers.

use crate::{ApiError, SharedState, api_error, sourced_json};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::json;
use tidewater_core::WalletSection;
use tidewater_core::error::WalletError;
use tidewater_wallet::TransferRequest;
use tracing::{error, info};

pub(crate) async fn balance_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let wallet_id = state.wallet.farmer_wallet().to_string();
    let balance = state.wallet.balance(&wallet_id).await;

    // A fallback figure is not the farmer's balance; keep the placeholder.
    state.context.update_wallet(WalletSection {
        balance: balance.is_live().then(|| balance.data().usdc_balance),
        wallet_address: Some(state.wallet.farmer_address().to_string()),
        ..Default::default()
    });
    Json(sourced_json(&balance))
}

pub(crate) async fn activity_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let activity = state.wallet.activity().await;

    if activity.is_live() {
        state.context.update_wallet(WalletSection {
            activity: Some(activity.data().clone()),
            ..Default::default()
        });
    }
    Json(sourced_json(&activity.map(|activities| json!({ "activities": activities }))))
}

#[derive(Debug, Deserialize)]
pub struct TransferBody {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub recipient: Option<String>,
}

pub(crate) async fn transfer_handler(
    State(state): State<SharedState>,
    Json(body): Json<TransferBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let amount = body.amount.unwrap_or_default();
    let request = TransferRequest {
        amount,
        recipient: body.recipient,
    };

    let receipt = state.wallet.transfer(&request).await.map_err(|e| match e {
        WalletError::InvalidAmount(_) => api_error(StatusCode::BAD_REQUEST, "Invalid amount"),
        other => {
            error!(error = %other, "Subsidy transfer failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to execute transfer: {other}"),
            )
        }
    })?;
    info!(
        amount,
        transaction_id = %receipt.data().transaction_id,
        live = receipt.is_live(),
        "Subsidy transfer processed"
    );

    if receipt.is_live() {
        state.context.update_wallet(WalletSection {
            activity: Some(vec![json!({
                "type": "subsidy_transfer",
                "amount": amount,
                "timestamp": receipt.data().timestamp,
            })]),
            ..Default::default()
        });
    }
    Ok(Json(sourced_json(&receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedProvider, Harness};
    use tidewater_tools::mock::{FARMER_ADDRESS, MockBrokerage, MockWallet};

    fn offline() -> Harness {
        Harness::new(
            FixedProvider(Ok(String::new())),
            MockBrokerage::default(),
            MockWallet::offline(),
        )
    }

    #[tokio::test]
    async fn balance_updates_wallet_context() {
        let harness = Harness::replying("");
        let (status, body) = harness.get("/api/wallet/balance").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usdc_balance"], 250.0);
        assert_eq!(body["source"], "live");

        let prompt = harness.state.context.render_for_prompt();
        assert!(prompt.contains("USDC Balance: 250 USDC"));
        assert!(prompt.contains(FARMER_ADDRESS));
    }

    #[tokio::test]
    async fn offline_balance_is_marked_fallback() {
        let harness = offline();
        let (status, body) = harness.get("/api/wallet/balance").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["usdc_balance"], 10000.0);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["reason"], "wallet service offline");

        let prompt = harness.state.context.render_for_prompt();
        assert!(prompt.contains("- USDC Balance: Loading... USDC"));
        assert!(!prompt.contains("10000"));
        assert!(prompt.contains(FARMER_ADDRESS));
    }

    #[tokio::test]
    async fn activity_lists_entries() {
        let harness = Harness::replying("");
        let (status, body) = harness.get("/api/wallet/activity").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activities"][0]["id"], "tx1");
        assert!(harness.state.context.render_for_prompt().contains("Recent Transactions: 1"));

        let offline = offline();
        let (_, body) = offline.get("/api/wallet/activity").await;
        assert_eq!(body["activities"], json!([]));
        assert!(offline.state.context.snapshot().wallet.is_none());
    }

    #[tokio::test]
    async fn transfer_sends_to_farmer_by_default() {
        let harness = Harness::replying("");
        let (status, body) = harness.post("/api/wallet/transfer", json!({"amount": 100})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["to"], "Farmer Ted");
        assert_eq!(body["recipient_address"], FARMER_ADDRESS);
        assert_eq!(harness.wallet.transfers()[0].amount, 100.0);

        let activity = harness.state.context.snapshot().wallet.unwrap().activity.unwrap();
        assert_eq!(activity[0]["type"], "subsidy_transfer");
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let harness = Harness::replying("");
        for body in [json!({"amount": 0}), json!({"amount": -5}), json!({})] {
            let (status, response) = harness.post("/api/wallet/transfer", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "Invalid amount");
        }
        assert!(harness.wallet.transfers().is_empty());
    }

    #[tokio::test]
    async fn refused_transfer_is_simulated() {
        let (status, body) = offline().post("/api/wallet/transfer", json!({"amount": 5})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed (simulated)");
        assert_eq!(body["source"], "fallback");
    }
}
