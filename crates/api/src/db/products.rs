//! Product repository for database operations.
//!
//! Every product mutation that changes an existing row goes through
//! [`ProductRepository::update_with_log`], which snapshots the pre-update
//! state into `product_logs` inside the same transaction as the update.

use sqlx::PgPool;

use orchard_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Page, Product, ProductListItem};

const SELECT_PRODUCT: &str =
    "SELECT id, name, price, category, created_by, created_at, updated_at FROM products";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether a product with this name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        price: Price,
        category: &str,
        created_by: UserId,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO products (name, price, category, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, price, category, created_by, created_at, updated_at",
        )
        .bind(name)
        .bind(price)
        .bind(category)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product name already exists".to_owned());
            }
            RepositoryError::Database(e)
        })
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Apply a partial update, writing a `product_logs` snapshot of the
    /// pre-update state first. Both writes share one transaction: a failure
    /// at either step persists neither.
    ///
    /// `None` fields leave the current value untouched. The snapshot's
    /// `created_by` is the product's original creator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_with_log(
        &self,
        id: ProductId,
        name: Option<&str>,
        category: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Product>(&format!(
            "{SELECT_PRODUCT} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            "INSERT INTO product_logs (product_id, name, price, category, created_by) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(current.id)
        .bind(&current.name)
        .bind(current.price)
        .bind(&current.category)
        .bind(current.created_by)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query_as::<_, Product>(
            "UPDATE products \
             SET name = COALESCE($2, name), category = COALESCE($3, category), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, price, category, created_by, created_at, updated_at",
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// One page of the listing projection, newest-updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_page(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<Page<ProductListItem>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let items = sqlx::query_as::<_, ProductListItem>(
            "SELECT id, name, price, category FROM products \
             ORDER BY updated_at DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(Page::<ProductListItem>::offset(page, per_page))
        .fetch_all(self.pool)
        .await?;

        Ok(Page::new(page, per_page, total, items))
    }
}
