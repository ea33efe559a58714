//! Human-readable order codes.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A human-readable order code: `ORD_<YYYY-MM-DD>_<6-digit sequence>`.
///
/// The date part records the day the order was created; the sequence part
/// comes from a single global counter and does not reset across dates, so
/// codes are unique even when the date repeats in a different position of
/// the sequence space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Build a code from a creation date and a sequence number.
    ///
    /// The sequence is zero-padded to six digits; values beyond 999999
    /// simply widen the field rather than wrap.
    #[must_use]
    pub fn new(date: NaiveDate, sequence: i64) -> Self {
        Self(format!("ORD_{}_{sequence:06}", date.format("%Y-%m-%d")))
    }

    /// The sequence component, if the code is well-formed.
    #[must_use]
    pub fn sequence(&self) -> Option<i64> {
        self.0.rsplit('_').next()?.parse().ok()
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format() {
        let code = OrderCode::new(date(2023, 5, 1), 1);
        assert_eq!(code.as_str(), "ORD_2023-05-01_000001");
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(
            OrderCode::new(date(2023, 12, 31), 42).as_str(),
            "ORD_2023-12-31_000042"
        );
        assert_eq!(
            OrderCode::new(date(2023, 12, 31), 123_456).as_str(),
            "ORD_2023-12-31_123456"
        );
    }

    #[test]
    fn test_wide_sequence_does_not_wrap() {
        let code = OrderCode::new(date(2024, 1, 1), 1_000_000);
        assert_eq!(code.as_str(), "ORD_2024-01-01_1000000");
        assert_eq!(code.sequence(), Some(1_000_000));
    }

    #[test]
    fn test_sequence_extraction() {
        let code = OrderCode::new(date(2023, 5, 1), 987);
        assert_eq!(code.sequence(), Some(987));
    }

    #[test]
    fn test_sequence_continues_across_dates() {
        // The counter is global: a new date does not restart the sequence.
        let day1 = OrderCode::new(date(2023, 5, 1), 5);
        let day2 = OrderCode::new(date(2023, 5, 2), 6);
        assert_eq!(day1.sequence(), Some(5));
        assert_eq!(day2.sequence(), Some(6));
    }
}
