//! Order number type.
//!
//! The human-facing order identifier (e.g. printed on packing slips and
//! used in status-update URLs), distinct from the internal `OrderId`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OrderNumberError {
    /// The input string is empty.
    #[error("order number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("order number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A human-facing order number (business key).
///
/// Unique per order; used to look an order up from the outside. Kept opaque
/// beyond basic length validation - different upstream shops format these
/// differently ("OD-1042", "#1042", ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Maximum length of an order number.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an `OrderNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or longer than 64 characters.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OrderNumberError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(OrderNumberError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for OrderNumber {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for OrderNumber {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let n = OrderNumber::parse("OD-1042").unwrap();
        assert_eq!(n.as_str(), "OD-1042");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let n = OrderNumber::parse("  OD-1042 ").unwrap();
        assert_eq!(n.as_str(), "OD-1042");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(OrderNumber::parse(""), Err(OrderNumberError::Empty)));
        assert!(matches!(
            OrderNumber::parse("   "),
            Err(OrderNumberError::Empty)
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "x".repeat(65);
        assert!(matches!(
            OrderNumber::parse(&long),
            Err(OrderNumberError::TooLong { .. })
        ));
    }

    #[test]
    fn test_display() {
        let n = OrderNumber::parse("OD-7").unwrap();
        assert_eq!(n.to_string(), "OD-7");
    }
}
