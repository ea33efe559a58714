//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The amount carries more than two decimal places.
    #[error("price must have at most two decimal places")]
    TooPrecise,
}

/// A product price.
///
/// Non-negative, at most two decimal places. The system deals in a single
/// implicit currency, so no currency code is carried. With the
/// `serde-with-str` feature of `rust_decimal`, prices serialize to JSON as
/// strings (`"19.99"`), which keeps exact decimal values across the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Construct a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or has more than two
    /// decimal places.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() {
            return Err(PriceError::Negative);
        }
        if amount.scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature): stored as NUMERIC.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_valid() {
        let price = Price::new(Decimal::from_str("19.99").unwrap()).unwrap();
        assert_eq!(price.to_string(), "19.99");
    }

    #[test]
    fn test_new_integer() {
        let price = Price::new(Decimal::from_str("100").unwrap()).unwrap();
        assert_eq!(price.to_string(), "100");
    }

    #[test]
    fn test_new_negative() {
        let result = Price::new(Decimal::from_str("-1.00").unwrap());
        assert!(matches!(result, Err(PriceError::Negative)));
    }

    #[test]
    fn test_new_too_precise() {
        let result = Price::new(Decimal::from_str("1.999").unwrap());
        assert!(matches!(result, Err(PriceError::TooPrecise)));
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::new(Decimal::from_str("12.50").unwrap()).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"12.50\"");
    }
}
