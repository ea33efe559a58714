//! Social login route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};
use crate::services::social::{Provider, SocialService};
use crate::state::AppState;

/// Query parameters delivered by the provider's callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// `GET /login/{provider}`
///
/// Sends the user to the provider's authorization page.
pub async fn redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect> {
    let provider = Provider::parse(&provider)?;
    let url = state.providers().authorize_url(provider)?;
    Ok(Redirect::temporary(&url))
}

/// `GET /login/{provider}/callback`
///
/// Exchanges the authorization code for the provider profile, then
/// first-or-creates the local user, upserts the linked identity, and
/// returns a fresh `user`-scoped token alongside the user object.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<Value>> {
    let provider = Provider::parse(&provider)?;
    let code = query.code.ok_or(ApiError::InvalidProviderCredentials)?;

    let profile = state.providers().authenticate(provider, &code).await?;
    let (token, user) = SocialService::new(state.pool())
        .login(provider, profile)
        .await?;

    Ok(Json(json!({
        "token": token,
        "user": user,
        "message": "success"
    })))
}
