//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::validate::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request validation failed.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Invalid credentials (wrong password, unknown user, or bad token).
    /// Deliberately carries no detail.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
