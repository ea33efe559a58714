//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   the generic `DATABASE_URL`)
//!
//! ## Optional
//! - `ORCHARD_HOST` - Bind address (default: 127.0.0.1)
//! - `ORCHARD_PORT` - Listen port (default: 8080)
//! - `ORCHARD_BASE_URL` - Public URL, used in OAuth redirect URIs
//!   (default: `http://localhost:8080`)
//!
//! ## Social login (each provider optional; all three vars or none)
//! - `FACEBOOK_CLIENT_ID` / `FACEBOOK_CLIENT_SECRET`
//! - `TWITTER_CLIENT_ID` / `TWITTER_CLIENT_SECRET`
//! - `GOOGLE_CLIENT_ID` / `GOOGLE_CLIENT_SECRET`

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used to build OAuth redirect URIs
    pub base_url: String,
    /// Social login provider credentials
    pub social: SocialConfig,
}

/// OAuth credentials per supported provider. A provider without
/// credentials is treated as unconfigured and its login endpoint fails.
#[derive(Debug, Clone, Default)]
pub struct SocialConfig {
    pub facebook: Option<ProviderCredentials>,
    pub twitter: Option<ProviderCredentials>,
    pub google: Option<ProviderCredentials>,
}

/// OAuth client credentials for one provider.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORCHARD_DATABASE_URL")?;
        let host = get_env_or_default("ORCHARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORCHARD_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("ORCHARD_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORCHARD_PORT".to_owned(), e.to_string()))?;
        let base_url = get_env_or_default("ORCHARD_BASE_URL", "http://localhost:8080");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            social: SocialConfig::from_env(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SocialConfig {
    fn from_env() -> Self {
        Self {
            facebook: provider_from_env("FACEBOOK"),
            twitter: provider_from_env("TWITTER"),
            google: provider_from_env("GOOGLE"),
        }
    }
}

fn provider_from_env(prefix: &str) -> Option<ProviderCredentials> {
    let client_id = get_optional_env(&format!("{prefix}_CLIENT_ID"))?;
    let client_secret = get_optional_env(&format!("{prefix}_CLIENT_SECRET"))?;
    Some(ProviderCredentials {
        client_id,
        client_secret: SecretString::from(client_secret),
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            base_url: "http://localhost:8080".to_owned(),
            social: SocialConfig::default(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_provider_credentials_debug_redacts_secret() {
        let creds = ProviderCredentials {
            client_id: "client_id_value".to_owned(),
            client_secret: SecretString::from("super_secret_value"),
        };

        let debug_output = format!("{creds:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_value"));
    }
}
