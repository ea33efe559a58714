//! Authentication extractor for protected routes.
//!
//! Provides an extractor that resolves the `Authorization: Bearer` header
//! to a [`CurrentUser`]. Capability checks stay in the handlers, which know
//! which capability their action requires.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with 401 when the header is missing, malformed, or the token is
/// unknown or revoked. It does NOT check capabilities; handlers do that
/// with [`CurrentUser::can`] / [`CurrentUser::can_any`].
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(current): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;

        let current = AuthService::new(state.pool())
            .verify_token(token)
            .await
            .map_err(|_| ApiError::Unauthenticated)?;

        Ok(Self(current))
    }
}

/// The token part of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/admin/me");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer 12|secretsecret"));
        assert_eq!(bearer_token(&parts), Some("12|secretsecret"));
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn test_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_none());
    }
}
