//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};

use orchard_core::{Group, ProductId};

use super::PageQuery;
use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::services::products::{ListSource, ProductService};
use crate::state::AppState;

/// `GET /admin/product` — any valid bearer token.
///
/// Uncached listing for authenticated staff.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let page = ProductService::new(state.pool()).list(query.page()).await?;
    Ok(Json(json!({"message": "success", "items": page})))
}

/// `POST /admin/product` — capability: `Admin`.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    if !current.can(Group::Admin) {
        return Err(ApiError::PermissionDenied);
    }

    ProductService::new(state.pool())
        .create(current.user.id, &body)
        .await?;
    Ok(Json(json!({"message": "success"})))
}

/// `PUT /admin/product/{id}` — capability: `Admin` or `Editor`.
///
/// Snapshots the pre-update state into the product log, then applies the
/// supplied fields, all in one transaction.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    if !current.can_any(&[Group::Admin, Group::Editor]) {
        return Err(ApiError::PermissionDenied);
    }

    ProductService::new(state.pool()).update(id, &body).await?;
    Ok(Json(json!({"message": "success"})))
}

/// `GET /product/list` — public, read-through cached (20 s TTL).
///
/// The `message` field tells consumers whether the page came from the
/// cache (`"cached"`) or was freshly computed (`"success"`).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let (source, page) = ProductService::new(state.pool())
        .list_cached(state.listing_cache(), query.page())
        .await?;

    let message = match source {
        ListSource::Cache => "cached",
        ListSource::Fresh => "success",
    };
    Ok(Json(json!({"message": message, "items": page})))
}
