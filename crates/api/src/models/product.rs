//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{Price, ProductId, UserId};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Unique product name.
    pub name: String,
    /// Current price.
    pub price: Price,
    /// Free-form category label.
    pub category: String,
    /// The user who created the product.
    pub created_by: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The projection served by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ProductListItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
}
