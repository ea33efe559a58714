//! Order repository for database operations.
//!
//! Order creation is a single transaction: the code counter, the order row,
//! and every line item commit together or not at all.

use chrono::Utc;
use sqlx::PgPool;

use orchard_core::{OrderCode, OrderId, Price, ProductId};

use super::RepositoryError;
use crate::models::NewOrder;

/// The product fields denormalized onto each line item.
#[derive(sqlx::FromRow)]
struct ProductSnapshot {
    name: String,
    price: Price,
    category: String,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order and its line items atomically.
    ///
    /// The order code comes from the `order_sequence` counter row; the
    /// `UPDATE .. RETURNING` takes a row-level lock that serializes
    /// concurrent creates, so two requests can never observe the same
    /// sequence value. The counter is global and does not reset across
    /// dates.
    ///
    /// Each line item captures the product's name, price, and category as
    /// they are at this moment; later product changes do not touch it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if any item references a product
    /// that does not exist. Returns `RepositoryError::Database` for other
    /// database errors. In every error case the transaction is rolled back
    /// and no rows remain.
    pub async fn create_with_items(
        &self,
        order: &NewOrder,
    ) -> Result<(OrderId, OrderCode), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sequence: i64 = sqlx::query_scalar(
            "UPDATE order_sequence SET last_value = last_value + 1 \
             WHERE id = 1 RETURNING last_value",
        )
        .fetch_one(&mut *tx)
        .await?;

        let code = OrderCode::new(Utc::now().date_naive(), sequence);

        let order_id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (code, email, phone, address, address_tax) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&code)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.address_tax.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            let product = self.fetch_snapshot(&mut tx, item.product_id).await?;

            sqlx::query(
                "INSERT INTO order_items \
                 (order_id, product_id, product_name, product_price, product_category, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.category)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok((order_id, code))
    }

    async fn fetch_snapshot(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        product_id: ProductId,
    ) -> Result<ProductSnapshot, RepositoryError> {
        sqlx::query_as::<_, ProductSnapshot>(
            "SELECT name, price, category FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
