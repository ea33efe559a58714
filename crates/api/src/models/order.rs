//! Order domain types.

use orchard_core::{Email, Phone, ProductId};

/// A validated order ready to be persisted.
///
/// Produced by order validation; by the time this exists, only the
/// existence of the referenced products remains to be checked (inside the
/// creation transaction).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub email: Email,
    pub phone: Phone,
    pub address: String,
    pub address_tax: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// One requested line of a new order.
///
/// Product name/price/category are denormalized onto the stored line item
/// at insert time, not here.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
}
