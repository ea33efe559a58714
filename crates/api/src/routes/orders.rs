//! Order route handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::Result;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// `POST /order/create`
///
/// Validates the payload, then persists the order and all its line items in
/// one transaction. Any failure rolls the whole order back.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let code = OrderService::new(state.pool()).create(&body).await?;
    tracing::info!(order_code = %code, "order created");
    Ok(Json(json!({"message": "success"})))
}
