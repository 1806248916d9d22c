//! Crossmint custodial wallet client (staging API, `x-api-key` auth).

use crate::{Balance, FALLBACK_BALANCE, TransferReceipt, TransferRequest, Wallet};
use async_trait::async_trait;
use serde_json::Value;
use tidewater_config::WalletConfig;
use tidewater_core::Sourced;
use tidewater_core::error::WalletError;
use tracing::{debug, info, warn};

pub struct CrossmintClient {
    config: WalletConfig,
    client: reqwest::Client,
}

impl CrossmintClient {
    pub fn new(config: &WalletConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let mut config = config.clone();
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn versioned(&self, version: &str, path: &str) -> String {
        format!("{}/{}/{}", self.config.base_url, version, path)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, WalletError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(url)
            .query(query)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))
    }

    fn api_key(&self) -> Result<&str, WalletError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| WalletError::NotConfigured("CROSSMINT_API_KEY is not set".into()))
    }

    async fn fetch_activity(&self, wallet_id: &str) -> Result<Vec<Value>, WalletError> {
        let url = self.versioned(
            &self.config.activity_api_version,
            &format!("wallets/{wallet_id}/activity"),
        );
        let payload = self
            .get_json(&url, &[("chain", self.config.chain.as_str())])
            .await?;
        Ok(activity_entries(payload))
    }

    async fn submit_transfer(&self, recipient: &str, amount: f64) -> Result<Value, WalletError> {
        let api_key = self.api_key()?;
        let url = self.versioned(
            &self.config.api_version,
            &format!(
                "wallets/{}/tokens/{}:{}/transfers",
                self.config.treasury_wallet, self.config.chain, self.config.token
            ),
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(&serde_json::json!({
                "recipient": recipient,
                "amount": amount.to_string(),
            }))
            .send()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))
    }

    fn receipt(
        &self,
        recipient: &str,
        amount: f64,
        transaction_id: String,
        status: &str,
    ) -> TransferReceipt {
        let to = if recipient == self.config.farmer_address {
            "Farmer Ted".to_string()
        } else {
            recipient.to_string()
        };

        TransferReceipt {
            success: true,
            amount,
            currency: "USDC".into(),
            from: "Uncle Sam".into(),
            to,
            recipient_address: recipient.to_string(),
            transaction_id,
            status: status.into(),
            network: self.config.chain.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Pull the token amount out of a balances payload.
///
/// The service has answered both as a bare array and as an object with a
/// `tokens` or `balances` array; entries name the token under `token`,
/// `currency` or `symbol`.
fn extract_token_amount(payload: &Value, token: &str) -> Option<f64> {
    let entries = match payload {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("tokens")
            .or_else(|| map.get("balances"))
            .and_then(Value::as_array)?,
        _ => return None,
    };

    entries.iter().find_map(|entry| {
        let name = ["token", "currency", "symbol"]
            .iter()
            .find_map(|k| entry.get(*k).and_then(Value::as_str))?;
        if !name.to_lowercase().contains(&token.to_lowercase()) {
            return None;
        }
        match entry.get("amount")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    })
}

fn activity_entries(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("activities").or_else(|| map.remove("events")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[async_trait]
impl Wallet for CrossmintClient {
    fn farmer_address(&self) -> &str {
        &self.config.farmer_address
    }

    fn farmer_wallet(&self) -> &str {
        &self.config.farmer_wallet
    }

    async fn balance(&self, wallet_id: &str) -> Sourced<Balance> {
        let url = self.versioned(&self.config.api_version, &format!("wallets/{wallet_id}/balances"));
        let query = [
            ("tokens", self.config.token.as_str()),
            ("chains", self.config.chain.as_str()),
        ];

        let balance = |usdc_balance| Balance {
            wallet_id: wallet_id.to_string(),
            usdc_balance,
            currency: "USDC".into(),
            network: self.config.chain.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        match self.get_json(&url, &query).await {
            Ok(payload) => {
                let amount = extract_token_amount(&payload, &self.config.token).unwrap_or(0.0);
                debug!(wallet_id, amount, "Fetched wallet balance");
                Sourced::live(balance(amount))
            }
            Err(e) => {
                warn!(wallet_id, error = %e, "Wallet balance unavailable, using fallback");
                Sourced::fallback(balance(FALLBACK_BALANCE), e.to_string())
            }
        }
    }

    async fn activity(&self) -> Sourced<Vec<Value>> {
        let farmer_err = match self.fetch_activity(&self.config.farmer_wallet).await {
            Ok(items) => return Sourced::live(items),
            Err(e) => e,
        };
        debug!(error = %farmer_err, "Farmer activity unavailable, trying treasury");

        match self.fetch_activity(&self.config.treasury_wallet).await {
            Ok(items) => Sourced::live(items),
            Err(e) => {
                warn!(error = %e, "Wallet activity unavailable");
                Sourced::fallback(Vec::new(), format!("{farmer_err}; {e}"))
            }
        }
    }

    async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<Sourced<TransferReceipt>, WalletError> {
        if !(request.amount.is_finite() && request.amount > 0.0) {
            return Err(WalletError::InvalidAmount(request.amount));
        }

        let recipient = request
            .recipient
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.config.farmer_address)
            .to_string();

        info!(amount = request.amount, recipient = %recipient, "Executing subsidy transfer");

        match self.submit_transfer(&recipient, request.amount).await {
            Ok(result) => {
                let transaction_id = result
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("tx_{}", chrono::Utc::now().timestamp_millis()));
                Ok(Sourced::live(self.receipt(
                    &recipient,
                    request.amount,
                    transaction_id,
                    "completed",
                )))
            }
            Err(e) => {
                warn!(error = %e, "Transfer refused, returning simulated receipt");
                let transaction_id = format!("mock_tx_{}", chrono::Utc::now().timestamp_millis());
                Ok(Sourced::fallback(
                    self.receipt(
                        &recipient,
                        request.amount,
                        transaction_id,
                        "completed (simulated)",
                    ),
                    e.to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base: &str) -> CrossmintClient {
        CrossmintClient::new(&WalletConfig {
            api_key: Some("ck_test".into()),
            base_url: base.into(),
            ..Default::default()
        })
    }

    #[test]
    fn token_amount_from_tokens_array() {
        let payload = serde_json::json!({
            "tokens": [
                {"currency": "eth", "amount": "0.1"},
                {"currency": "usdc", "amount": "42.5"}
            ]
        });
        assert_eq!(extract_token_amount(&payload, "usdc"), Some(42.5));
    }

    #[test]
    fn token_amount_from_bare_array() {
        let payload = serde_json::json!([{"token": "USDC", "amount": 7}]);
        assert_eq!(extract_token_amount(&payload, "usdc"), Some(7.0));
        assert_eq!(extract_token_amount(&serde_json::json!({}), "usdc"), None);
    }

    #[test]
    fn activity_accepts_wrapped_or_bare_lists() {
        let wrapped = serde_json::json!({"activities": [{"id": "a"}]});
        assert_eq!(activity_entries(wrapped).len(), 1);
        assert_eq!(activity_entries(serde_json::json!([1, 2])).len(), 2);
        assert!(activity_entries(serde_json::json!("nope")).is_empty());
    }

    #[tokio::test]
    async fn unconfigured_balance_falls_back() {
        let client = CrossmintClient::new(&WalletConfig::default());
        let balance = client.balance("userId:farmerted:evm").await;
        assert!(!balance.is_live());
        assert_eq!(balance.data().usdc_balance, FALLBACK_BALANCE);
        assert!(balance.reason().unwrap().contains("CROSSMINT_API_KEY"));
    }

    #[tokio::test]
    async fn live_balance_is_extracted() {
        let router = Router::new().route(
            "/2025-06-09/wallets/{wallet}/balances",
            get(|| async { axum::Json(serde_json::json!([{"token": "usdc", "amount": "12.5"}])) }),
        );
        let base = serve(router).await;

        let balance = client_for(&base).balance("userId:farmerted:evm").await;
        assert!(balance.is_live());
        assert_eq!(balance.data().usdc_balance, 12.5);
        assert_eq!(balance.data().wallet_id, "userId:farmerted:evm");
    }

    #[tokio::test]
    async fn activity_falls_through_to_treasury() {
        let router = Router::new().route(
            "/unstable/wallets/{wallet}/activity",
            get(|Path(wallet): Path<String>| async move {
                if wallet == "userId:unclesam:evm" {
                    Ok(axum::Json(serde_json::json!({"activities": [{"id": "tx1"}]})))
                } else {
                    Err(StatusCode::NOT_FOUND)
                }
            }),
        );
        let base = serve(router).await;

        let activity = client_for(&base).activity().await;
        assert!(activity.is_live());
        assert_eq!(activity.data().len(), 1);
        assert_eq!(activity.data()[0]["id"], "tx1");
    }

    #[tokio::test]
    async fn activity_empty_when_both_wallets_fail() {
        let base = serve(Router::new()).await;
        let activity = client_for(&base).activity().await;
        assert!(!activity.is_live());
        assert!(activity.data().is_empty());
    }

    #[tokio::test]
    async fn transfer_rejects_non_positive_amounts() {
        let client = CrossmintClient::new(&WalletConfig::default());
        for amount in [0.0, -5.0, f64::NAN] {
            let err = client
                .transfer(&TransferRequest {
                    amount,
                    recipient: None,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, WalletError::InvalidAmount(_)));
        }
    }

    #[tokio::test]
    async fn live_transfer_uses_returned_id() {
        let router = Router::new().route(
            "/2025-06-09/wallets/{wallet}/tokens/{token}/transfers",
            post(|axum::Json(body): axum::Json<Value>| async move {
                assert_eq!(body["amount"], "25");
                axum::Json(serde_json::json!({"id": "xfer_123"}))
            }),
        );
        let base = serve(router).await;

        let receipt = client_for(&base)
            .transfer(&TransferRequest {
                amount: 25.0,
                recipient: None,
            })
            .await
            .unwrap();
        assert!(receipt.is_live());
        let receipt = receipt.into_data();
        assert_eq!(receipt.transaction_id, "xfer_123");
        assert_eq!(receipt.to, "Farmer Ted");
        assert_eq!(receipt.status, "completed");
    }

    #[tokio::test]
    async fn refused_transfer_is_simulated() {
        let client = CrossmintClient::new(&WalletConfig::default());
        let receipt = client
            .transfer(&TransferRequest {
                amount: 10.0,
                recipient: Some("0xabc".into()),
            })
            .await
            .unwrap();

        assert!(!receipt.is_live());
        let data = receipt.data();
        assert!(data.success);
        assert!(data.transaction_id.starts_with("mock_tx_"));
        assert_eq!(data.status, "completed (simulated)");
        assert_eq!(data.to, "0xabc");
        assert_eq!(data.network, "ethereum-sepolia");
    }
}
