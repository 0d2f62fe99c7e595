//! User Password Value Object
//!
//! Domain wrappers over `platform::password`:
//! - [`RawPassword`] is what the user typed (zeroized on drop)
//! - [`UserPassword`] is the encoded Argon2id hash as stored in `users.password_hash`
//!
//! Hashing and verification are CPU-bound, so both run on the blocking pool
//! and never while a database connection is checked out.

use std::fmt;

use platform::password::{
    self, Argon2Params, ClearTextPassword, EncodedHash, PasswordPolicyError,
};
use tokio::task;

use crate::error::AuthResult;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Normalize and apply the password policy (8 to 64 characters).
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw).map(Self)
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Encoded password hash
///
/// Kept as the stored string. Parsing happens at verification time so that
/// a corrupt row surfaces as `MalformedHash` on login instead of breaking
/// every query that loads the user.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(String);

impl UserPassword {
    /// Hash `raw` with a fresh salt.
    pub async fn hash(raw: RawPassword, params: Argon2Params) -> AuthResult<Self> {
        // A blocking task is not aborted when this future is dropped. It runs
        // to completion and its result is discarded.
        let encoded =
            task::spawn_blocking(move || password::hash_password(&raw.0, &params)).await??;
        Ok(Self(encoded.to_string()))
    }

    /// Well-formed hash that matches nothing, costed like a real one.
    pub fn timing_decoy(params: &Argon2Params) -> AuthResult<Self> {
        Ok(Self(EncodedHash::timing_decoy(params)?.to_string()))
    }

    pub(crate) fn from_db(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check `raw` against this hash using the parameters embedded in it.
    pub async fn verify(&self, raw: RawPassword) -> AuthResult<bool> {
        let encoded = self.0.clone();
        // Same as `hash`: cancelling the caller leaves the verification
        // running on the blocking pool until it finishes.
        let matched =
            task::spawn_blocking(move || password::verify_password(&raw.0, &encoded)).await??;
        Ok(matched)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    fn raw(s: &str) -> RawPassword {
        RawPassword::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hashed = UserPassword::hash(raw("Secret123"), Argon2Params::default())
            .await
            .unwrap();
        assert!(hashed.as_str().starts_with("$argon2id$"));
        assert!(hashed.verify(raw("Secret123")).await.unwrap());
        assert!(!hashed.verify(raw("Secret1234")).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_malformed_not_mismatch() {
        let stored = UserPassword::from_db("$argon2id$v=19$garbage".to_string());
        let result = stored.verify(raw("Secret123")).await;
        assert!(matches!(result, Err(AuthError::MalformedHash(_))));
    }

    #[tokio::test]
    async fn test_timing_decoy_rejects() {
        let decoy = UserPassword::timing_decoy(&Argon2Params::default()).unwrap();
        assert!(decoy.as_str().starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(!decoy.verify(raw("Secret123")).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_verify_does_not_poison_later_calls() {
        let hashed = UserPassword::hash(raw("Secret123"), Argon2Params::default())
            .await
            .unwrap();

        // Drop the future while its blocking task is still running
        let dropped = tokio::time::timeout(
            std::time::Duration::from_micros(1),
            hashed.verify(raw("Secret123")),
        )
        .await;
        drop(dropped);

        assert!(hashed.verify(raw("Secret123")).await.unwrap());
    }

    #[test]
    fn test_policy() {
        assert!(matches!(
            RawPassword::new("wrong".to_string()),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(format!("{:?}", raw("Secret123")).contains("REDACTED"));
        assert!(format!("{:?}", UserPassword::from_db("x".to_string())).contains("[HASH]"));
    }
}
