//! Employee phone contact.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Contact`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// The contact contains something other than ASCII digits.
    #[error("contact must contain only digits")]
    NonDigit,
    /// The contact has the wrong number of digits.
    #[error("contact must have between {min} and {max} digits (got {len})")]
    Length {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
        /// Digits supplied.
        len: usize,
    },
}

/// A phone contact made of 9 to 15 ASCII digits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Contact(String);

impl Contact {
    /// Fewest digits accepted.
    pub const MIN_DIGITS: usize = 9;
    /// Most digits accepted.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Contact`.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::NonDigit`] for any non-digit character and
    /// [`ContactError::Length`] when the digit count is out of range.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContactError::NonDigit);
        }
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&s.len()) {
            return Err(ContactError::Length {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                len: s.len(),
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Contact {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Contact> for String {
    fn from(contact: Contact) -> Self {
        contact.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Contact {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Contact {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Contact {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_boundaries() {
        assert!(Contact::parse("912345678").is_ok());
        assert!(Contact::parse("123456789012345").is_ok());
    }

    #[test]
    fn test_rejects_short_and_long() {
        assert!(matches!(
            Contact::parse("12345678"),
            Err(ContactError::Length { len: 8, .. })
        ));
        assert!(matches!(
            Contact::parse("1234567890123456"),
            Err(ContactError::Length { len: 16, .. })
        ));
    }

    #[test]
    fn test_rejects_formatting_characters() {
        assert_eq!(Contact::parse("+351912345678"), Err(ContactError::NonDigit));
        assert_eq!(Contact::parse("912 345 678"), Err(ContactError::NonDigit));
        assert_eq!(
            Contact::parse(""),
            Err(ContactError::Length {
                min: 9,
                max: 15,
                len: 0
            })
        );
    }
}
