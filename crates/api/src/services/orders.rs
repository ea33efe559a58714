//! Order service: validation and transactional creation.

use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

use orchard_core::OrderCode;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::models::{NewOrder, NewOrderItem};
use crate::validate::{FieldErrors, Rules};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Request validation failed; no write was attempted.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// An item referenced a product that does not exist. The transaction
    /// was rolled back.
    #[error("order references an unknown product")]
    ProductNotFound,

    /// The creation transaction failed and was rolled back.
    #[error("order creation failed: {0}")]
    Failed(RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Validate an order payload and persist it atomically.
    ///
    /// Validation covers the shape of every field (dotted-path messages for
    /// item fields); whether the referenced products exist is checked only
    /// inside the transaction, so an unknown product yields 404 rather than
    /// a field error.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` before any write,
    /// `OrderError::ProductNotFound` for an unknown product (rolled back),
    /// and `OrderError::Failed` for any other transaction failure (rolled
    /// back).
    pub async fn create(&self, body: &Value) -> Result<OrderCode, OrderError> {
        let order = validate_order(body).map_err(OrderError::Validation)?;

        let (_, code) = self
            .orders
            .create_with_items(&order)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OrderError::ProductNotFound,
                other => OrderError::Failed(other),
            })?;

        Ok(code)
    }
}

/// Check every field of an order payload, accumulating dotted-path errors.
fn validate_order(body: &Value) -> Result<NewOrder, FieldErrors> {
    let mut rules = Rules::new(body);

    let email = rules.required_email("email");
    let phone = rules.required_phone("phone");
    let address = rules.required_string("address", None);
    let address_tax = rules.optional_string("address_tax", None);

    let mut items = Vec::new();
    if let Some(raw_items) = rules.required_array("items") {
        for index in 0..raw_items.len() {
            let product_id = rules.required_product_id(&format!("items.{index}.product_id"));
            let quantity = rules.required_quantity(&format!("items.{index}.product_quantity"));
            if let (Some(product_id), Some(quantity)) = (product_id, quantity) {
                items.push(NewOrderItem {
                    product_id,
                    quantity,
                });
            }
        }
    }

    rules.finish()?;

    // A clean finish means every required rule produced a value.
    let (Some(email), Some(phone), Some(address)) = (email, phone, address) else {
        unreachable!("required fields either parse or record a field error")
    };

    Ok(NewOrder {
        email,
        phone,
        address,
        address_tax,
        items,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "email": "top@tt.com",
            "phone": "0123456789",
            "address": "address 1",
            "address_tax": "address_tax 1",
            "items": [
                {"product_id": 1, "product_quantity": 2}
            ]
        })
    }

    #[test]
    fn test_valid_order_passes() {
        let order = validate_order(&valid_body()).unwrap();
        assert_eq!(order.email.as_str(), "top@tt.com");
        assert_eq!(order.phone.as_str(), "0123456789");
        assert_eq!(order.address, "address 1");
        assert_eq!(order.address_tax.as_deref(), Some("address_tax 1"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn test_address_tax_is_optional() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("address_tax");
        let order = validate_order(&body).unwrap();
        assert!(order.address_tax.is_none());
    }

    #[test]
    fn test_invalid_email() {
        let mut body = valid_body();
        body["email"] = json!("top");
        let errors = validate_order(&body).unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            &["The email must be a valid email address.".to_owned()]
        );
    }

    #[test]
    fn test_missing_email() {
        let mut body = valid_body();
        body["email"] = json!("");
        let errors = validate_order(&body).unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            &["The email field is required.".to_owned()]
        );
    }

    #[test]
    fn test_short_phone() {
        let mut body = valid_body();
        body["phone"] = json!("00");
        let errors = validate_order(&body).unwrap_err();
        assert_eq!(
            errors.get("phone").unwrap(),
            &["The phone must be 10 digits.".to_owned()]
        );
    }

    #[test]
    fn test_missing_items() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("items");
        let errors = validate_order(&body).unwrap_err();
        assert_eq!(
            errors.get("items").unwrap(),
            &["The items field is required.".to_owned()]
        );
    }

    #[test]
    fn test_item_errors_use_dotted_paths() {
        let mut body = valid_body();
        body["items"] = json!([
            {"product_id": "", "product_quantity": 2},
            {"product_id": 3}
        ]);
        let errors = validate_order(&body).unwrap_err();
        assert_eq!(
            errors.get("items.0.product_id").unwrap(),
            &["The items.0.product_id field is required.".to_owned()]
        );
        assert_eq!(
            errors.get("items.1.product_quantity").unwrap(),
            &["The items.1.product_quantity field is required.".to_owned()]
        );
        assert!(errors.get("items.1.product_id").is_none());
    }

    #[test]
    fn test_multiple_failures_reported_together() {
        let body = json!({
            "email": "top",
            "phone": "00",
            "address": "",
            "items": []
        });
        let errors = validate_order(&body).unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
        assert!(errors.get("address").is_some());
        assert!(errors.get("items").is_some());
    }
}
