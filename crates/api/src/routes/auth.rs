//! Account and authentication route handlers.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use orchard_core::Group;

use crate::error::{ApiError, Result};
use crate::middleware::RequireAuth;
use crate::services::auth::{AuthService, TokenResponse};
use crate::state::AppState;

/// `POST /admin/register`
///
/// Creates an account. No token is issued; the caller logs in separately.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    AuthService::new(state.pool()).register(&body).await?;
    Ok(Json(json!({"message": "success"})))
}

/// `POST /admin/login`
///
/// Verifies credentials, revokes all previously issued tokens, and returns
/// one fresh bearer token carrying the user's group.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<TokenResponse>> {
    let token = AuthService::new(state.pool()).login(&body).await?;
    Ok(Json(token))
}

/// `GET /admin/me` — capability: `Editor` (exact match).
pub async fn me(RequireAuth(current): RequireAuth) -> Result<Json<crate::models::User>> {
    if !current.can(Group::Editor) {
        return Err(ApiError::PermissionDenied);
    }
    Ok(Json(current.user))
}
