//! Unified error handling.
//!
//! Provides a single `ApiError` type mapping every failure class to its
//! HTTP response. All route handlers return `Result<T, ApiError>`.
//!
//! Clients get opaque messages; the underlying error detail is written to
//! the server log only. This includes transaction failures, which reach the
//! client as `{"message": ..., "status": "failed"}` with a fixed message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::services::products::ProductError;
use crate::services::social::SocialError;
use crate::validate::FieldErrors;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request validation failed; per-field messages for the client.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// The token does not carry the required capability.
    #[error("permission denied")]
    PermissionDenied,

    /// Resource not found. The payload names the entity ("product").
    #[error("not found {0}")]
    NotFound(&'static str),

    /// Login failed. Deliberately generic: unknown email and wrong
    /// password are indistinguishable to the caller.
    #[error("invalid login details")]
    InvalidLogin,

    /// Missing or invalid bearer token.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Social login with a provider outside the supported set.
    #[error("unsupported provider")]
    UnsupportedProvider,

    /// The OAuth provider rejected the callback credentials.
    #[error("invalid provider credentials")]
    InvalidProviderCredentials,

    /// A multi-step write failed and was rolled back.
    #[error("transaction failed: {message}")]
    Transaction {
        /// Fixed client-facing message for this operation.
        message: &'static str,
        #[source]
        source: RepositoryError,
    },

    /// Database operation failed outside a transactional flow.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Server-side detail for failures the client only sees opaquely.
        match &self {
            Self::Transaction { message, source } => {
                tracing::error!(error = %source, "{message}");
            }
            Self::Database(source) => {
                tracing::error!(error = %source, "request failed on database error");
            }
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
            }
            _ => {}
        }

        let (status, body) = match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, json!({ "error": errors })),
            Self::PermissionDenied => (
                StatusCode::FORBIDDEN,
                json!({"message": "permission denied"}),
            ),
            Self::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("not found {entity}") }),
            ),
            Self::InvalidLogin => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "Invalid login details"}),
            ),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({"message": "unauthenticated"}),
            ),
            Self::UnsupportedProvider => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": "Please login using facebook, twitter or google"}),
            ),
            Self::InvalidProviderCredentials => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"error": "Invalid credentials provided."}),
            ),
            Self::Transaction { message, .. } => (
                StatusCode::BAD_REQUEST,
                json!({"message": message, "status": "failed"}),
            ),
            Self::Database(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"message": "internal server error"}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::InvalidCredentials => Self::InvalidLogin,
            AuthError::Repository(source) => Self::Database(source),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(errors) => Self::Validation(errors),
            ProductError::NotFound => Self::NotFound("product"),
            ProductError::UpdateFailed(source) => Self::Transaction {
                message: "Can not update product",
                source,
            },
            ProductError::Repository(source) => Self::Database(source),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(errors) => Self::Validation(errors),
            OrderError::ProductNotFound => Self::NotFound("product"),
            OrderError::Failed(source) => Self::Transaction {
                message: "Can not save order",
                source,
            },
        }
    }
}

impl From<SocialError> for ApiError {
    fn from(err: SocialError) -> Self {
        match err {
            SocialError::UnsupportedProvider => Self::UnsupportedProvider,
            SocialError::InvalidCredentials => Self::InvalidProviderCredentials,
            SocialError::Failed(source) => Self::Transaction {
                message: "Can not save user",
                source,
            },
            SocialError::Auth(err) => Self::from(*err),
            SocialError::NotConfigured(provider) => {
                Self::Internal(format!("social provider not configured: {provider}"))
            }
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        let mut errors = FieldErrors::new();
        errors.add("email", "The email field is required.");
        assert_eq!(status_of(ApiError::Validation(errors)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ApiError::PermissionDenied),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ApiError::NotFound("product")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::InvalidLogin),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::UnsupportedProvider),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ApiError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transaction_failure_is_bad_request() {
        let err = ApiError::Transaction {
            message: "Can not save order",
            source: RepositoryError::NotFound,
        };
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_error_is_internal() {
        let err = ApiError::Database(RepositoryError::DataCorruption("bad row".to_owned()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
