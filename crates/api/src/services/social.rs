//! Social login via external OAuth providers.
//!
//! The provider side lives behind [`ProviderGateway`]: hand it a provider
//! and an authorization code, get back a [`ProviderProfile`]. The service
//! then first-or-creates the local user, upserts the linked identity, and
//! issues a bearer token scoped to the `user` capability. Accounts created
//! this way get a random password; their holders log in through the
//! provider, not the password form.

use async_trait::async_trait;
use rand::distr::{Alphanumeric, SampleString};
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use url::Url;

use orchard_core::{Email, Group};

use crate::config::{ProviderCredentials, SocialConfig};
use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::auth::{AuthError, AuthService, hash_password};

/// Length of the random password given to social-login accounts.
const RANDOM_PASSWORD_LENGTH: usize = 10;

/// Errors that can occur during social login.
#[derive(Debug, Error)]
pub enum SocialError {
    /// The path named a provider outside the supported set.
    #[error("unsupported provider")]
    UnsupportedProvider,

    /// The provider rejected the exchange, or the profile was unusable.
    #[error("invalid provider credentials")]
    InvalidCredentials,

    /// The provider is supported but has no configured OAuth credentials.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The user/identity transaction failed and was rolled back.
    #[error("social account persistence failed: {0}")]
    Failed(RepositoryError),

    /// Token issuance or hashing failed.
    #[error(transparent)]
    Auth(Box<AuthError>),
}

/// The supported OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Facebook,
    Twitter,
    Google,
}

impl Provider {
    /// The provider's path segment and storage label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Google => "google",
        }
    }

    /// Parse a provider from its path segment.
    ///
    /// # Errors
    ///
    /// Returns `SocialError::UnsupportedProvider` for anything else.
    pub fn parse(s: &str) -> Result<Self, SocialError> {
        match s {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "google" => Ok(Self::Google),
            _ => Err(SocialError::UnsupportedProvider),
        }
    }

    const fn authorize_endpoint(self) -> &'static str {
        match self {
            Self::Facebook => "https://www.facebook.com/v18.0/dialog/oauth",
            Self::Twitter => "https://twitter.com/i/oauth2/authorize",
            Self::Google => "https://accounts.google.com/o/oauth2/v2/auth",
        }
    }

    const fn token_endpoint(self) -> &'static str {
        match self {
            Self::Facebook => "https://graph.facebook.com/v18.0/oauth/access_token",
            Self::Twitter => "https://api.twitter.com/2/oauth2/token",
            Self::Google => "https://oauth2.googleapis.com/token",
        }
    }

    const fn profile_endpoint(self) -> &'static str {
        match self {
            Self::Facebook => "https://graph.facebook.com/me?fields=id,name,email,picture",
            Self::Twitter => "https://api.twitter.com/2/users/me?user.fields=profile_image_url",
            Self::Google => "https://www.googleapis.com/oauth2/v3/userinfo",
        }
    }

    const fn scope(self) -> &'static str {
        match self {
            Self::Facebook => "email",
            Self::Twitter => "users.read tweet.read",
            Self::Google => "openid email profile",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a provider tells us about the authenticated person.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    /// The provider-assigned account ID.
    pub external_id: String,
    /// Email, when the provider shares one.
    pub email: Option<String>,
    /// Display name, when the provider shares one.
    pub name: Option<String>,
    /// Avatar URL, when the provider shares one.
    pub avatar: Option<String>,
}

/// Capability interface to the external OAuth providers.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// The URL to redirect the user to for authorization.
    ///
    /// # Errors
    ///
    /// Returns `SocialError::NotConfigured` when the provider has no
    /// credentials.
    fn authorize_url(&self, provider: Provider) -> Result<String, SocialError>;

    /// Exchange an authorization code for the user's profile.
    ///
    /// # Errors
    ///
    /// Returns `SocialError::InvalidCredentials` when the provider rejects
    /// the exchange, and `SocialError::NotConfigured` when credentials are
    /// missing.
    async fn authenticate(
        &self,
        provider: Provider,
        code: &str,
    ) -> Result<ProviderProfile, SocialError>;
}

/// `ProviderGateway` over plain HTTPS with `reqwest`.
pub struct HttpProviderGateway {
    http: reqwest::Client,
    social: SocialConfig,
    base_url: String,
}

impl HttpProviderGateway {
    /// Create a gateway from the configured provider credentials.
    #[must_use]
    pub fn new(social: SocialConfig, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            social,
            base_url,
        }
    }

    fn credentials(&self, provider: Provider) -> Result<&ProviderCredentials, SocialError> {
        let creds = match provider {
            Provider::Facebook => self.social.facebook.as_ref(),
            Provider::Twitter => self.social.twitter.as_ref(),
            Provider::Google => self.social.google.as_ref(),
        };
        creds.ok_or_else(|| SocialError::NotConfigured(provider.to_string()))
    }

    fn redirect_uri(&self, provider: Provider) -> String {
        format!("{}/login/{provider}/callback", self.base_url)
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    fn authorize_url(&self, provider: Provider) -> Result<String, SocialError> {
        let creds = self.credentials(provider)?;

        let mut url = Url::parse(provider.authorize_endpoint())
            .map_err(|_| SocialError::NotConfigured(provider.to_string()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &creds.client_id)
            .append_pair("redirect_uri", &self.redirect_uri(provider))
            .append_pair("response_type", "code")
            .append_pair("scope", provider.scope());

        Ok(url.into())
    }

    async fn authenticate(
        &self,
        provider: Provider,
        code: &str,
    ) -> Result<ProviderProfile, SocialError> {
        let creds = self.credentials(provider)?;

        let token_response: Value = self
            .http
            .post(provider.token_endpoint())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &creds.client_id),
                ("client_secret", creds.client_secret.expose_secret()),
                ("redirect_uri", &self.redirect_uri(provider)),
            ])
            .send()
            .await
            .map_err(|_| SocialError::InvalidCredentials)?
            .error_for_status()
            .map_err(|_| SocialError::InvalidCredentials)?
            .json()
            .await
            .map_err(|_| SocialError::InvalidCredentials)?;

        let access_token = token_response
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or(SocialError::InvalidCredentials)?;

        let raw_profile: Value = self
            .http
            .get(provider.profile_endpoint())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|_| SocialError::InvalidCredentials)?
            .error_for_status()
            .map_err(|_| SocialError::InvalidCredentials)?
            .json()
            .await
            .map_err(|_| SocialError::InvalidCredentials)?;

        parse_profile(provider, &raw_profile).ok_or(SocialError::InvalidCredentials)
    }
}

/// Map a provider's profile payload onto the common shape.
fn parse_profile(provider: Provider, raw: &Value) -> Option<ProviderProfile> {
    let string = |v: &Value, key: &str| v.get(key).and_then(Value::as_str).map(str::to_owned);

    match provider {
        Provider::Google => Some(ProviderProfile {
            external_id: string(raw, "sub")?,
            email: string(raw, "email"),
            name: string(raw, "name"),
            avatar: string(raw, "picture"),
        }),
        Provider::Facebook => Some(ProviderProfile {
            external_id: string(raw, "id")?,
            email: string(raw, "email"),
            name: string(raw, "name"),
            avatar: raw
                .get("picture")
                .and_then(|p| p.get("data"))
                .and_then(|d| d.get("url"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        }),
        Provider::Twitter => {
            let data = raw.get("data")?;
            Some(ProviderProfile {
                external_id: string(data, "id")?,
                email: string(data, "email"),
                name: string(data, "name"),
                avatar: string(data, "profile_image_url"),
            })
        }
    }
}

/// Social login service.
pub struct SocialService<'a> {
    users: UserRepository<'a>,
    auth: AuthService<'a>,
}

impl<'a> SocialService<'a> {
    /// Create a new social login service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            auth: AuthService::new(pool),
        }
    }

    /// Complete a provider callback: first-or-create the local user, upsert
    /// the linked identity, and issue a bearer token.
    ///
    /// The token carries the `user` capability regardless of the account's
    /// group; social login never grants admin powers.
    ///
    /// # Errors
    ///
    /// Returns `SocialError::InvalidCredentials` when the profile has no
    /// usable email, `SocialError::Failed` if persistence failed (rolled
    /// back), and `SocialError::Auth` if token issuance failed.
    pub async fn login(
        &self,
        provider: Provider,
        profile: ProviderProfile,
    ) -> Result<(String, User), SocialError> {
        let email = profile
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .ok_or(SocialError::InvalidCredentials)?;

        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| local_part(email.as_str()).to_owned());

        // Never used to log in; social accounts authenticate through the
        // provider. Hashed all the same.
        let password = Alphanumeric.sample_string(&mut rand::rng(), RANDOM_PASSWORD_LENGTH);
        let password_hash = hash_password(&password).map_err(|e| SocialError::Auth(Box::new(e)))?;

        let user = self
            .users
            .first_or_create_with_identity(
                &email,
                &name,
                &password_hash,
                provider.as_str(),
                &profile.external_id,
                profile.avatar.as_deref(),
            )
            .await
            .map_err(SocialError::Failed)?;

        let token = self
            .auth
            .issue_token(user.id, Group::User)
            .await
            .map_err(|e| SocialError::Auth(Box::new(e)))?;

        Ok((token, user))
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;

    fn gateway() -> HttpProviderGateway {
        let social = SocialConfig {
            facebook: None,
            twitter: None,
            google: Some(ProviderCredentials {
                client_id: "google-client".to_owned(),
                client_secret: SecretString::from("google-secret"),
            }),
        };
        HttpProviderGateway::new(social, "http://localhost:8080".to_owned())
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("facebook").unwrap(), Provider::Facebook);
        assert_eq!(Provider::parse("twitter").unwrap(), Provider::Twitter);
        assert_eq!(Provider::parse("google").unwrap(), Provider::Google);
        assert!(matches!(
            Provider::parse("github"),
            Err(SocialError::UnsupportedProvider)
        ));
        assert!(matches!(
            Provider::parse("Google"),
            Err(SocialError::UnsupportedProvider)
        ));
    }

    #[test]
    fn test_authorize_url_carries_client_and_redirect() {
        let url = gateway().authorize_url(Provider::Google).unwrap();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=google-client"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("login%2Fgoogle%2Fcallback"));
    }

    #[test]
    fn test_authorize_url_unconfigured_provider() {
        assert!(matches!(
            gateway().authorize_url(Provider::Facebook),
            Err(SocialError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_parse_google_profile() {
        let raw = json!({
            "sub": "10923",
            "email": "g@example.com",
            "name": "G User",
            "picture": "https://lh3.example/pic"
        });
        let profile = parse_profile(Provider::Google, &raw).unwrap();
        assert_eq!(profile.external_id, "10923");
        assert_eq!(profile.email.as_deref(), Some("g@example.com"));
        assert_eq!(profile.avatar.as_deref(), Some("https://lh3.example/pic"));
    }

    #[test]
    fn test_parse_facebook_profile_nested_avatar() {
        let raw = json!({
            "id": "fb-77",
            "name": "F User",
            "email": "f@example.com",
            "picture": {"data": {"url": "https://graph.example/pic"}}
        });
        let profile = parse_profile(Provider::Facebook, &raw).unwrap();
        assert_eq!(profile.external_id, "fb-77");
        assert_eq!(profile.avatar.as_deref(), Some("https://graph.example/pic"));
    }

    #[test]
    fn test_parse_twitter_profile() {
        let raw = json!({
            "data": {"id": "tw-5", "name": "T User", "profile_image_url": "https://pbs.example/p"}
        });
        let profile = parse_profile(Provider::Twitter, &raw).unwrap();
        assert_eq!(profile.external_id, "tw-5");
        assert!(profile.email.is_none());
    }

    #[test]
    fn test_parse_profile_missing_id_is_none() {
        assert!(parse_profile(Provider::Google, &json!({"email": "x@y.z"})).is_none());
    }

    #[test]
    fn test_local_part() {
        assert_eq!(local_part("jane@example.com"), "jane");
    }
}
