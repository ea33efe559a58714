//! Declarative request validation.
//!
//! Request bodies arrive as raw JSON and are checked field by field against
//! the rules each endpoint declares. Failures accumulate into a
//! [`FieldErrors`] map keyed by the field's dotted path
//! (`items.0.product_id`), which serializes straight into the 400 response
//! body. No field error ever aborts validation early; the caller gets every
//! problem in one round trip.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use orchard_core::{Email, EmailError, Group, Phone, PhoneError, Price, ProductId};

/// Accepted price shape: integral, or up to two decimal places.
static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\d+(\.\d{1,2})?$").unwrap()
});

/// Per-field validation messages, keyed by dotted field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// An empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field path.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// True when no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The messages recorded for one field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the accumulated map when any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Resolve a dotted path (`items.0.product_id`) inside a JSON value.
#[must_use]
pub fn lookup<'v>(body: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = body;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Rule evaluator bound to one request body.
///
/// Each method checks one field and returns the parsed value on success;
/// on failure it records a message and returns `None`. Call [`Rules::finish`]
/// once all fields have been checked.
pub struct Rules<'a> {
    body: &'a Value,
    errors: FieldErrors,
}

impl<'a> Rules<'a> {
    #[must_use]
    pub fn new(body: &'a Value) -> Self {
        Self {
            body,
            errors: FieldErrors::new(),
        }
    }

    /// `Ok(())` when every rule passed, otherwise the accumulated errors.
    ///
    /// # Errors
    ///
    /// Returns the `FieldErrors` map when any rule failed.
    pub fn finish(self) -> Result<(), FieldErrors> {
        self.errors.into_result()
    }

    /// Record an out-of-band failure (e.g. a uniqueness check) against a field.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    /// A field's value as a string, if it is a JSON string or number.
    ///
    /// Numbers are accepted wherever strings are so that clients sending
    /// `"phone": 123` and `"phone": "123"` hit the same rule messages.
    fn raw_string(&self, field: &str) -> Option<String> {
        match lookup(self.body, field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Whether the field counts as present (required-rule semantics:
    /// missing, null, and the empty string all fail).
    fn is_present(&self, field: &str) -> bool {
        match lookup(self.body, field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// `required` + `string` + optional `max` length.
    pub fn required_string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        if !self.is_present(field) {
            self.errors.add(field, required_message(field));
            return None;
        }
        let Some(value) = self.raw_string(field) else {
            self.errors
                .add(field, format!("The {field} must be a string."));
            return None;
        };
        if let Some(max) = max
            && value.len() > max
        {
            self.errors.add(
                field,
                format!("The {field} may not be greater than {max} characters."),
            );
            return None;
        }
        Some(value)
    }

    /// Like [`Rules::required_string`], but absence and the empty string are
    /// fine and yield `None` without an error.
    pub fn optional_string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        if !self.is_present(field) {
            return None;
        }
        let Some(value) = self.raw_string(field) else {
            self.errors
                .add(field, format!("The {field} must be a string."));
            return None;
        };
        if let Some(max) = max
            && value.len() > max
        {
            self.errors.add(
                field,
                format!("The {field} may not be greater than {max} characters."),
            );
            return None;
        }
        Some(value)
    }

    /// `required` + `email` + `max:255`.
    pub fn required_email(&mut self, field: &str) -> Option<Email> {
        let value = self.required_string(field, None)?;
        match Email::parse(&value) {
            Ok(email) => Some(email),
            Err(EmailError::TooLong { max }) => {
                self.errors.add(
                    field,
                    format!("The {field} may not be greater than {max} characters."),
                );
                None
            }
            Err(_) => {
                self.errors.add(
                    field,
                    format!("The {field} must be a valid email address."),
                );
                None
            }
        }
    }

    /// `required` + `numeric` + `digits:10`.
    pub fn required_phone(&mut self, field: &str) -> Option<Phone> {
        let value = self.required_string(field, None)?;
        match Phone::parse(&value) {
            Ok(phone) => Some(phone),
            Err(PhoneError::NonDigit) => {
                self.errors
                    .add(field, format!("The {field} must be a number."));
                None
            }
            Err(_) => {
                self.errors.add(
                    field,
                    format!("The {field} must be {} digits.", Phone::DIGITS),
                );
                None
            }
        }
    }

    /// `required` + `min:<chars>` (passwords).
    pub fn required_min_chars(&mut self, field: &str, min: usize) -> Option<String> {
        let value = self.required_string(field, None)?;
        if value.chars().count() < min {
            self.errors.add(
                field,
                format!("The {field} must be at least {min} characters."),
            );
            return None;
        }
        Some(value)
    }

    /// `required` + membership of the assignable group set.
    pub fn required_group(&mut self, field: &str) -> Option<Group> {
        let value = self.required_string(field, None)?;
        match Group::parse(&value) {
            Ok(group) if Group::ASSIGNABLE.contains(&group) => Some(group),
            _ => {
                self.errors
                    .add(field, format!("The selected {field} is invalid."));
                None
            }
        }
    }

    /// `required` + the price pattern `^\d+(\.\d{1,2})?$`.
    pub fn required_price(&mut self, field: &str) -> Option<Price> {
        let value = self.required_string(field, None)?;
        if !PRICE_PATTERN.is_match(&value) {
            self.errors
                .add(field, format!("The {field} format is invalid."));
            return None;
        }
        let parsed = Decimal::from_str(&value)
            .ok()
            .and_then(|amount| Price::new(amount).ok());
        match parsed {
            Some(price) => Some(price),
            None => {
                self.errors
                    .add(field, format!("The {field} format is invalid."));
                None
            }
        }
    }

    /// `required` + integral `numeric` + `min:1` (quantities).
    pub fn required_quantity(&mut self, field: &str) -> Option<i32> {
        let value = self.required_string(field, None)?;
        let Ok(quantity) = value.parse::<i32>() else {
            self.errors
                .add(field, format!("The {field} must be a number."));
            return None;
        };
        if quantity < 1 {
            self.errors
                .add(field, format!("The {field} must be at least 1."));
            return None;
        }
        Some(quantity)
    }

    /// `required` + numeric id reference.
    pub fn required_product_id(&mut self, field: &str) -> Option<ProductId> {
        let value = self.required_string(field, None)?;
        match value.parse::<ProductId>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.errors
                    .add(field, format!("The {field} must be a number."));
                None
            }
        }
    }

    /// `required` non-empty array.
    pub fn required_array(&mut self, field: &str) -> Option<&'a [Value]> {
        match lookup(self.body, field) {
            Some(Value::Array(items)) if !items.is_empty() => Some(items.as_slice()),
            Some(Value::Array(_)) | Some(Value::Null) | None => {
                self.errors.add(field, required_message(field));
                None
            }
            Some(_) => {
                self.errors
                    .add(field, format!("The {field} must be an array."));
                None
            }
        }
    }
}

fn required_message(field: &str) -> String {
    format!("The {field} field is required.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_dotted_paths() {
        let body = json!({"items": [{"product_id": 7}]});
        assert_eq!(
            lookup(&body, "items.0.product_id"),
            Some(&Value::from(7))
        );
        assert!(lookup(&body, "items.1.product_id").is_none());
        assert!(lookup(&body, "missing").is_none());
    }

    #[test]
    fn test_required_string_missing() {
        let body = json!({});
        let mut rules = Rules::new(&body);
        assert!(rules.required_string("name", Some(255)).is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["The name field is required.".to_owned()]
        );
    }

    #[test]
    fn test_required_string_empty_fails() {
        let body = json!({"address": ""});
        let mut rules = Rules::new(&body);
        assert!(rules.required_string("address", None).is_none());
        let errors = rules.finish().unwrap_err();
        assert!(errors.get("address").is_some());
    }

    #[test]
    fn test_required_string_max() {
        let body = json!({"name": "x".repeat(256)});
        let mut rules = Rules::new(&body);
        assert!(rules.required_string("name", Some(255)).is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("name").unwrap(),
            &["The name may not be greater than 255 characters.".to_owned()]
        );
    }

    #[test]
    fn test_optional_string_absent_is_ok() {
        let body = json!({});
        let mut rules = Rules::new(&body);
        assert!(rules.optional_string("address_tax", None).is_none());
        assert!(rules.finish().is_ok());
    }

    #[test]
    fn test_required_email_invalid() {
        let body = json!({"email": "top"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_email("email").is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("email").unwrap(),
            &["The email must be a valid email address.".to_owned()]
        );
    }

    #[test]
    fn test_required_email_valid() {
        let body = json!({"email": "top@tt.com"});
        let mut rules = Rules::new(&body);
        let email = rules.required_email("email").unwrap();
        assert_eq!(email.as_str(), "top@tt.com");
        assert!(rules.finish().is_ok());
    }

    #[test]
    fn test_required_phone_short() {
        let body = json!({"phone": "00"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_phone("phone").is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("phone").unwrap(),
            &["The phone must be 10 digits.".to_owned()]
        );
    }

    #[test]
    fn test_required_phone_non_numeric() {
        let body = json!({"phone": "01234x6789"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_phone("phone").is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("phone").unwrap(),
            &["The phone must be a number.".to_owned()]
        );
    }

    #[test]
    fn test_required_min_chars() {
        let body = json!({"password": "short"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_min_chars("password", 10).is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("password").unwrap(),
            &["The password must be at least 10 characters.".to_owned()]
        );
    }

    #[test]
    fn test_required_group_rejects_user_label() {
        // "user" is a real group but not assignable at registration.
        let body = json!({"group": "user"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_group("group").is_none());
        let errors = rules.finish().unwrap_err();
        assert_eq!(
            errors.get("group").unwrap(),
            &["The selected group is invalid.".to_owned()]
        );
    }

    #[test]
    fn test_required_price_pattern() {
        for valid in ["10", "10.5", "10.55", "0.99"] {
            let body = json!({ "price": valid });
            let mut rules = Rules::new(&body);
            assert!(rules.required_price("price").is_some(), "{valid}");
            assert!(rules.finish().is_ok());
        }
        for invalid in ["10.555", "-1", "1,00", "abc", ".5"] {
            let body = json!({ "price": invalid });
            let mut rules = Rules::new(&body);
            assert!(rules.required_price("price").is_none(), "{invalid}");
        }
    }

    #[test]
    fn test_required_price_accepts_json_number() {
        let body = json!({"price": 19.99});
        let mut rules = Rules::new(&body);
        assert!(rules.required_price("price").is_some());
        assert!(rules.finish().is_ok());
    }

    #[test]
    fn test_required_quantity() {
        let body = json!({"q": 2});
        let mut rules = Rules::new(&body);
        assert_eq!(rules.required_quantity("q"), Some(2));

        let body = json!({"q": "two"});
        let mut rules = Rules::new(&body);
        assert!(rules.required_quantity("q").is_none());

        let body = json!({"q": 0});
        let mut rules = Rules::new(&body);
        assert!(rules.required_quantity("q").is_none());
    }

    #[test]
    fn test_required_array_missing_and_empty() {
        for body in [json!({}), json!({ "items": [] })] {
            let mut rules = Rules::new(&body);
            assert!(rules.required_array("items").is_none());
            let errors = rules.finish().unwrap_err();
            assert_eq!(
                errors.get("items").unwrap(),
                &["The items field is required.".to_owned()]
            );
        }
    }

    #[test]
    fn test_dotted_item_paths() {
        let body = json!({"items": [{"product_quantity": 2}]});
        let mut rules = Rules::new(&body);
        assert!(rules.required_product_id("items.0.product_id").is_none());
        assert_eq!(rules.required_quantity("items.0.product_quantity"), Some(2));
        let errors = rules.finish().unwrap_err();
        assert!(errors.get("items.0.product_id").is_some());
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let body = json!({"email": "top", "phone": "00"});
        let mut rules = Rules::new(&body);
        rules.required_email("email");
        rules.required_phone("phone");
        rules.required_string("address", None);
        let errors = rules.finish().unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
        assert!(errors.get("address").is_some());
    }

    #[test]
    fn test_field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", "The email field is required.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            json!({"email": ["The email field is required."]})
        );
    }
}
