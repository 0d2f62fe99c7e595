//! Session ID Value Object
//!
//! 128 bits from the OS CSPRNG, base64url without padding (22 characters).
//! Nothing about a session ID is derived from time, counters or the user.

use std::fmt;

use platform::crypto::{self, RandomnessError};

/// Entropy per session ID
pub const SESSION_ID_BYTES: usize = 16;

/// Encoded length of [`SESSION_ID_BYTES`] in unpadded base64
pub const SESSION_ID_LENGTH: usize = 22;

/// Opaque session identifier; the primary key of the `sessions` table.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Result<Self, RandomnessError> {
        let bytes: [u8; SESSION_ID_BYTES] = crypto::random_array()?;
        Ok(Self(crypto::to_base64_url(&bytes)))
    }

    /// Accept a cookie value only if it has the exact shape of a generated ID.
    ///
    /// Anything else cannot name a session, so callers treat `None` as
    /// "no such session" without a store round-trip.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != SESSION_ID_LENGTH {
            return None;
        }
        match crypto::from_base64_url(value) {
            Ok(bytes) if bytes.len() == SESSION_ID_BYTES => Some(Self(value.to_string())),
            _ => None,
        }
    }

    pub(crate) fn from_db(value: String) -> Self {
        Self(value)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix safe to put in logs.
    pub fn log_prefix(&self) -> &str {
        self.0.get(..6).unwrap_or("")
    }
}

// Never print the full token.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({}…)", self.log_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_shape() {
        let id = SessionId::generate().unwrap();
        assert_eq!(id.as_str().len(), SESSION_ID_LENGTH);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| SessionId::generate().unwrap().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_parse_accepts_generated() {
        let id = SessionId::generate().unwrap();
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("short").is_none());
        // Right length, wrong alphabet
        assert!(SessionId::parse("AAAAAAAAAAAAAAAAAAAA+/").is_none());
        // Standard padding is not part of the format
        assert!(SessionId::parse("AAAAAAAAAAAAAAAAAAAAAA==").is_none());
    }

    #[test]
    fn test_debug_does_not_leak() {
        let id = SessionId::generate().unwrap();
        let debug = format!("{id:?}");
        assert!(!debug.contains(id.as_str()));
    }
}
