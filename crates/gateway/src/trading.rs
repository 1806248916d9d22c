//! Brokerage endpoints. Each successful read refreshes the brokerage
//! section of the shared context.

use crate::{ApiError, SharedState, api_error};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tidewater_brokerage::{Account, Order, OrderRequest, OrderStatusFilter, Position};
use tidewater_core::BrokerageSection;
use tidewater_core::error::BrokerageError;
use tracing::{error, info, warn};

/// Orders listed when the caller gives no limit.
const DEFAULT_ORDER_LIMIT: u32 = 50;

fn to_values<T: Serialize>(items: &[T]) -> Vec<serde_json::Value> {
    items
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect()
}

fn brokerage_failure(what: &str, e: BrokerageError) -> ApiError {
    error!(error = %e, "Failed to {what}");
    let status = match e {
        BrokerageError::InvalidOrder(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, format!("Failed to {what}: {e}"))
}

pub(crate) async fn account_handler(
    State(state): State<SharedState>,
) -> Result<Json<Account>, ApiError> {
    let account = state
        .brokerage
        .account()
        .await
        .map_err(|e| brokerage_failure("fetch account data", e))?;

    state.context.update_brokerage(BrokerageSection {
        account_info: serde_json::to_value(&account).ok(),
        ..Default::default()
    });
    Ok(Json(account))
}

pub(crate) async fn positions_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Position>>, ApiError> {
    let positions = state
        .brokerage
        .positions()
        .await
        .map_err(|e| brokerage_failure("fetch positions", e))?;

    info!(count = positions.len(), "Positions fetched");
    state.context.update_brokerage(BrokerageSection {
        positions: Some(to_values(&positions)),
        ..Default::default()
    });
    Ok(Json(positions))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub status: Option<OrderStatusFilter>,
    #[serde(default)]
    pub limit: Option<u32>,
}

pub(crate) async fn orders_handler(
    State(state): State<SharedState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let status = query.status.unwrap_or_default();
    let limit = query.limit.unwrap_or(DEFAULT_ORDER_LIMIT);
    let orders = state
        .brokerage
        .orders(status, limit)
        .await
        .map_err(|e| brokerage_failure("fetch orders", e))?;

    info!(count = orders.len(), status = status.as_str(), "Orders fetched");
    state.context.update_brokerage(BrokerageSection {
        orders: Some(to_values(&orders)),
        ..Default::default()
    });
    Ok(Json(orders))
}

pub(crate) async fn place_order_handler(
    State(state): State<SharedState>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .brokerage
        .place_order(&request)
        .await
        .map_err(|e| brokerage_failure("place order", e))?;
    info!(order_id = %order.id, symbol = %order.symbol, "Order placed from dashboard");

    match state
        .brokerage
        .orders(OrderStatusFilter::All, state.config.brokerage.recent_orders)
        .await
    {
        Ok(orders) => state.context.update_brokerage(BrokerageSection {
            orders: Some(to_values(&orders)),
            ..Default::default()
        }),
        Err(e) => warn!(error = %e, "Could not refresh recent orders"),
    }

    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FixedProvider, Harness};
    use serde_json::json;
    use tidewater_tools::mock::{MockBrokerage, MockWallet};

    fn failing() -> Harness {
        Harness::new(
            FixedProvider(Ok(String::new())),
            MockBrokerage::failing(BrokerageError::Api {
                status: 403,
                body: "forbidden".into(),
            }),
            MockWallet::default(),
        )
    }

    #[tokio::test]
    async fn account_is_returned_and_cached() {
        let harness = Harness::replying("");
        let (status, body) = harness.get("/api/brokerage/account").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ACTIVE");
        assert_eq!(body["buying_power"], 200000.0);

        let snapshot = harness.state.context.snapshot();
        let account = snapshot.brokerage.unwrap().account_info.unwrap();
        assert_eq!(account["equity"], 100500.0);
    }

    #[tokio::test]
    async fn positions_refresh_context() {
        let harness = Harness::replying("");
        let (status, body) = harness.get("/api/brokerage/positions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["symbol"], "AWK");
        assert_eq!(body[0]["side"], "long");
        assert!(harness.state.context.render_for_prompt().contains("Active Positions: 1"));
    }

    #[tokio::test]
    async fn placing_an_order_refreshes_recent_orders() {
        let harness = Harness::replying("");
        let (status, body) = harness
            .post(
                "/api/brokerage/orders",
                json!({"symbol": "xyl", "qty": 3, "side": "buy", "type": "market"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "XYL");
        assert_eq!(body["status"], "accepted");

        let (_, listed) = harness.get("/api/brokerage/orders?status=all&limit=5").await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert!(harness.state.context.render_for_prompt().contains("Recent Orders: 1"));
    }

    #[tokio::test]
    async fn invalid_order_is_bad_request() {
        let harness = Harness::replying("");
        let (status, body) = harness
            .post(
                "/api/brokerage/orders",
                json!({"symbol": "AWK", "qty": 1, "side": "buy", "type": "limit"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("limit_price"));
    }

    #[tokio::test]
    async fn brokerage_errors_are_500() {
        let harness = failing();
        for uri in [
            "/api/brokerage/account",
            "/api/brokerage/positions",
            "/api/brokerage/orders",
        ] {
            let (status, body) = harness.get(uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert!(body["error"].as_str().unwrap().contains("forbidden"), "{uri}");
        }
        assert!(harness.state.context.snapshot().brokerage.is_none());
    }
}
