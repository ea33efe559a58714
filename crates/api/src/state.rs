//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::{LISTING_TTL, ListingCache, MokaListingCache};
use crate::config::ApiConfig;
use crate::services::social::{HttpProviderGateway, ProviderGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the listing cache, and the
/// OAuth provider gateway.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    listing_cache: Arc<dyn ListingCache>,
    providers: Arc<dyn ProviderGateway>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let listing_cache: Arc<dyn ListingCache> =
            Arc::new(MokaListingCache::new(LISTING_TTL));
        let providers: Arc<dyn ProviderGateway> = Arc::new(HttpProviderGateway::new(
            config.social.clone(),
            config.base_url.clone(),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                listing_cache,
                providers,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the listing cache.
    #[must_use]
    pub fn listing_cache(&self) -> &dyn ListingCache {
        self.inner.listing_cache.as_ref()
    }

    /// Get the OAuth provider gateway.
    #[must_use]
    pub fn providers(&self) -> &dyn ProviderGateway {
        self.inner.providers.as_ref()
    }
}
