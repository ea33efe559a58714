//! Authentication service.
//!
//! Registration, login, and bearer-token issuance/verification.
//!
//! Tokens are opaque: the client holds `<token_id>|<secret>` where the
//! secret is 40 random alphanumeric characters; the database stores only
//! the secret's SHA-256 digest. Logging in revokes every token the user
//! already holds before issuing a new one (single active session policy).

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::distr::{Alphanumeric, SampleString};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use orchard_core::{Group, TokenId, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::{CurrentUser, User};
use crate::validate::{FieldErrors, Rules};

/// Minimum password length at registration.
const MIN_PASSWORD_LENGTH: usize = 10;

/// Length of the random token secret.
const TOKEN_SECRET_LENGTH: usize = 40;

/// A freshly issued bearer token, as returned by the login endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Plaintext `<token_id>|<secret>`; shown to the caller exactly once.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: &'static str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// No token is issued at registration; the user logs in separately.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with per-field messages (including
    /// a taken email) or `AuthError::Repository` on database failure.
    pub async fn register(&self, body: &Value) -> Result<User, AuthError> {
        let mut rules = Rules::new(body);
        let name = rules.required_string("name", Some(255));
        let email = rules.required_email("email");
        let password = rules.required_min_chars("password", MIN_PASSWORD_LENGTH);
        let group = rules.required_group("group");

        if let Some(ref email) = email
            && self.users.email_exists(email).await?
        {
            rules.add_error("email", "The email has already been taken.");
        }

        rules.finish().map_err(AuthError::Validation)?;

        // The rules above produced values or recorded errors; after a clean
        // finish, all four are present.
        let (Some(name), Some(email), Some(password), Some(group)) =
            (name, email, password, group)
        else {
            return Err(AuthError::PasswordHash);
        };

        let password_hash = hash_password(&password)?;

        self.users
            .create(&name, &email, &password_hash, group)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                RepositoryError::Conflict(_) => {
                    let mut errors = FieldErrors::new();
                    errors.add("email", "The email has already been taken.");
                    AuthError::Validation(errors)
                }
                other => AuthError::Repository(other),
            })
    }

    /// Login with email and password.
    ///
    /// On success all previously issued tokens are revoked and a single new
    /// token carrying the user's group is returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for malformed input and
    /// `AuthError::InvalidCredentials` for any credential mismatch (unknown
    /// email and wrong password are indistinguishable).
    pub async fn login(&self, body: &Value) -> Result<TokenResponse, AuthError> {
        let mut rules = Rules::new(body);
        let email = rules.required_email("email");
        let password = rules.required_string("password", None);
        rules.finish().map_err(AuthError::Validation)?;

        let (Some(email), Some(password)) = (email, password) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .find_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&password, &password_hash)?;

        let access_token = self.issue_token(user.id, user.group).await?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer",
        })
    }

    /// Revoke all of the user's tokens and issue one new token carrying
    /// `capability`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on database failure.
    pub async fn issue_token(
        &self,
        user_id: UserId,
        capability: Group,
    ) -> Result<String, AuthError> {
        self.users.revoke_tokens(user_id).await?;

        let secret = generate_secret();
        let token_id = self
            .users
            .insert_token(user_id, &digest(&secret), capability)
            .await?;

        Ok(format!("{}|{secret}", token_id.as_i32()))
    }

    /// Resolve a plaintext bearer token to its user and capability.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for malformed, unknown, or
    /// revoked tokens.
    pub async fn verify_token(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let (token_id, secret) =
            parse_plaintext(token).ok_or(AuthError::InvalidCredentials)?;

        let (user, stored_hash, capability) = self
            .users
            .find_token(token_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if digest(secret) != stored_hash {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(CurrentUser { user, capability })
    }
}

/// Generate a fresh random token secret.
fn generate_secret() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), TOKEN_SECRET_LENGTH)
}

/// SHA-256 hex digest of a token secret; this is what the database stores.
fn digest(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Split a plaintext token into its ID and secret parts.
fn parse_plaintext(token: &str) -> Option<(TokenId, &str)> {
    let (id, secret) = token.split_once('|')?;
    let id = id.parse::<i32>().ok()?;
    if secret.is_empty() {
        return None;
    }
    Some((TokenId::new(id), secret))
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), TOKEN_SECRET_LENGTH);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_digest_is_sha256_hex() {
        let d = digest("abc");
        assert_eq!(d.len(), 64);
        // Known SHA-256 of "abc"
        assert_eq!(
            d,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_parse_plaintext() {
        let (id, secret) = parse_plaintext("12|abcDEF123").unwrap();
        assert_eq!(id, TokenId::new(12));
        assert_eq!(secret, "abcDEF123");

        assert!(parse_plaintext("no-separator").is_none());
        assert!(parse_plaintext("x|secret").is_none());
        assert!(parse_plaintext("12|").is_none());
    }

    #[test]
    fn test_token_verification_digest_mismatch() {
        let secret = generate_secret();
        let stored = digest(&secret);
        assert_eq!(digest(&secret), stored);
        assert_ne!(digest("tampered"), stored);
    }
}
