//! User Name Value Object
//!
//! The user name is the login handle and the public display name.
//!
//! ## Rules
//! - NFKC normalization, then trim
//! - 1 to 30 characters after normalization
//! - No whitespace or control characters inside the name
//! - Case-sensitive: `Alice` and `alice` are different users
//!
//! Uniqueness is the store's job (unique index), not this type's.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length for user name (in characters)
pub const USER_NAME_MIN_LENGTH: usize = 1;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 30;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("User name cannot contain whitespace")]
    ContainsWhitespace,

    #[error("User name contains an invalid character at position {position}")]
    InvalidCharacter { position: usize },
}

/// Validated, normalized user name
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Normalize (NFKC, trim) and validate raw input.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let normalized = input.as_ref().nfkc().collect::<String>().trim().to_string();
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Rebuild from a stored row. Rows were validated on insert.
    pub(crate) fn from_db(value: String) -> Self {
        Self(value)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), UserNameError> {
        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(UserNameError::Empty);
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        for (position, ch) in name.chars().enumerate() {
            if ch.is_whitespace() {
                return Err(UserNameError::ContainsWhitespace);
            }
            if ch.is_control() {
                return Err(UserNameError::InvalidCharacter { position });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserName").field(&self.0).finish()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_whitespace() {
        let name = UserName::new("  alice  ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_case_is_preserved() {
        let upper = UserName::new("Alice").unwrap();
        let lower = UserName::new("alice").unwrap();
        assert_eq!(upper.as_str(), "Alice");
        assert_ne!(upper, lower);
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth 'Ａ' (U+FF21) normalizes to ASCII 'A'
        let name = UserName::new("Ａlice").unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_empty_fails() {
        assert_eq!(UserName::new(""), Err(UserNameError::Empty));
        assert_eq!(UserName::new("   "), Err(UserNameError::Empty));
    }

    #[test]
    fn test_single_character_is_allowed() {
        assert!(UserName::new("a").is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        assert!(matches!(
            UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
            Err(UserNameError::TooLong { length: 31, .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 30 three-byte characters
        assert!(UserName::new("日".repeat(USER_NAME_MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_inner_whitespace_rejected() {
        assert_eq!(
            UserName::new("alice bob"),
            Err(UserNameError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_control_character_rejected() {
        assert_eq!(
            UserName::new("al\u{0}ice"),
            Err(UserNameError::InvalidCharacter { position: 2 })
        );
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<UserName, _> = serde_json::from_str("\"bob\"");
        assert!(ok.is_ok());
        let err: Result<UserName, _> = serde_json::from_str("\"\"");
        assert!(err.is_err());
    }
}
