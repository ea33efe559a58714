//! Product service: CRUD with audit snapshots and the cached listing.

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

use orchard_core::{ProductId, UserId};

use crate::cache::{ListingCache, page_key};
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::{Page, Product, ProductListItem};
use crate::validate::{FieldErrors, Rules};

/// Fixed page size for both listing endpoints.
pub const PAGE_SIZE: i64 = 100;

/// Errors that can occur during product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Request validation failed.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// The target product does not exist.
    #[error("product not found")]
    NotFound,

    /// The snapshot-and-update transaction failed and was rolled back.
    #[error("product update failed: {0}")]
    UpdateFailed(RepositoryError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Where a listing page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// Served from the cache; no database access happened.
    Cache,
    /// Freshly computed from the database (and now cached).
    Fresh,
}

/// Product service.
pub struct ProductService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Create a product owned by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Validation` with per-field messages
    /// (including a taken name) or `ProductError::Repository` on database
    /// failure.
    pub async fn create(
        &self,
        created_by: UserId,
        body: &Value,
    ) -> Result<Product, ProductError> {
        let mut rules = Rules::new(body);
        let name = rules.required_string("name", Some(255));
        let price = rules.required_price("price");
        let category = rules.required_string("category", Some(255));

        if let Some(ref name) = name
            && self.products.name_exists(name).await?
        {
            rules.add_error("name", "The name has already been taken.");
        }

        rules.finish().map_err(ProductError::Validation)?;

        let (Some(name), Some(price), Some(category)) = (name, price, category) else {
            return Err(ProductError::Repository(RepositoryError::DataCorruption(
                "validated fields missing".to_owned(),
            )));
        };

        self.products
            .create(&name, price, &category, created_by)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent create.
                RepositoryError::Conflict(_) => {
                    let mut errors = FieldErrors::new();
                    errors.add("name", "The name has already been taken.");
                    ProductError::Validation(errors)
                }
                other => ProductError::Repository(other),
            })
    }

    /// Partially update a product, snapshotting its pre-update state.
    ///
    /// The target is checked before the body is validated: a missing
    /// product 404s even when the body is also invalid. Supplied fields
    /// replace the current values; absent or empty fields leave them
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product doesn't exist,
    /// `ProductError::Validation` for bad fields, and
    /// `ProductError::UpdateFailed` if the transaction failed (already
    /// rolled back).
    pub async fn update(&self, id: ProductId, body: &Value) -> Result<Product, ProductError> {
        if self.products.find(id).await?.is_none() {
            return Err(ProductError::NotFound);
        }

        let mut rules = Rules::new(body);
        let name = rules.optional_string("name", Some(255));
        let category = rules.optional_string("category", Some(255));

        if let Some(ref name) = name
            && self.products.name_exists(name).await?
        {
            rules.add_error("name", "The name has already been taken.");
        }

        rules.finish().map_err(ProductError::Validation)?;

        self.products
            .update_with_log(id, name.as_deref(), category.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ProductError::NotFound,
                other => ProductError::UpdateFailed(other),
            })
    }

    /// One page of the listing, straight from the database (the
    /// authenticated admin listing; no cache involved).
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on database failure.
    pub async fn list(&self, page: i64) -> Result<Page<ProductListItem>, ProductError> {
        Ok(self.products.list_page(page, PAGE_SIZE).await?)
    }

    /// One page of the public listing, read through the cache.
    ///
    /// A hit deserializes the stored payload and touches no tables. A miss
    /// queries, serializes, stores the payload for the cache's TTL, and
    /// returns it. Entries are never invalidated by writes: within the TTL
    /// window, a stale page is expected behavior.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` on database failure.
    pub async fn list_cached(
        &self,
        cache: &dyn ListingCache,
        page: i64,
    ) -> Result<(ListSource, Page<ProductListItem>), ProductError> {
        let key = page_key(page);

        if let Some(payload) = cache.get(&key).await {
            match serde_json::from_str(&payload) {
                Ok(cached) => return Ok((ListSource::Cache, cached)),
                Err(e) => {
                    // Unreadable payload: fall through to a fresh query,
                    // which overwrites the entry.
                    tracing::warn!(error = %e, key = %key, "discarding undecodable cache entry");
                }
            }
        }

        let fresh = self.products.list_page(page, PAGE_SIZE).await?;

        match serde_json::to_string(&fresh) {
            Ok(payload) => cache.put(key, payload).await,
            Err(e) => tracing::warn!(error = %e, "failed to serialize listing page for cache"),
        }

        Ok((ListSource::Fresh, fresh))
    }
}
