//! Password Hashing and Verification
//!
//! Argon2id credential hashing in PHC string format:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<digest>
//! ```
//!
//! Every parameter needed to re-derive the digest travels inside the string,
//! so hashes produced under older parameters keep verifying after the
//! defaults are raised.
//!
//! ## Security Features
//! - 16-byte salt per hash from the OS CSPRNG (failure is an error)
//! - Stored hashes must be canonical argon2id v19 with exactly `m,t,p`,
//!   anything else is [`PasswordHashError::MalformedHash`]
//! - Upper bounds on stored parameters so a corrupted row cannot request
//!   gigabytes of memory
//! - Constant-time digest comparison
//! - Clear-text passwords are zeroized

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{
    self, Output, ParamsString, PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{self, RandomnessError};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 64;

/// Salt length for newly created hashes
pub const SALT_LEN: usize = 16;

/// Digest length for newly created hashes
pub const DIGEST_LEN: usize = 32;

/// OWASP minimums for new hashes: t=2, m=19 MiB, p=1
pub const MIN_TIME_COST: u32 = 2;
pub const MIN_MEMORY_KIB: u32 = 19 * 1024;
pub const MIN_PARALLELISM: u32 = 1;

// Ceilings applied to every parameter set, stored or configured.
const MAX_TIME_COST: u32 = 64;
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
const MAX_PARALLELISM: u32 = 64;

// Decoded salt bytes accepted from storage
const STORED_SALT_LEN: std::ops::RangeInclusive<usize> = 8..=48;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error(transparent)]
    RandomnessUnavailable(#[from] RandomnessError),

    /// The stored string does not follow the encoded-hash grammar.
    #[error("malformed password hash: {0}")]
    MalformedHash(&'static str),

    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Parameters
// ============================================================================

/// Argon2id cost parameters.
///
/// [`Argon2Params::new`] refuses anything weaker than the OWASP minimums.
/// Parameters parsed back out of storage skip that floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    time_cost: u32,
    memory_kib: u32,
    parallelism: u32,
}

impl Argon2Params {
    pub fn new(
        time_cost: u32,
        memory_kib: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        if time_cost < MIN_TIME_COST {
            return Err(PasswordHashError::InvalidParams(format!(
                "time cost must be at least {MIN_TIME_COST} (got {time_cost})"
            )));
        }
        if memory_kib < MIN_MEMORY_KIB {
            return Err(PasswordHashError::InvalidParams(format!(
                "memory must be at least {MIN_MEMORY_KIB} KiB (got {memory_kib})"
            )));
        }
        if parallelism < MIN_PARALLELISM {
            return Err(PasswordHashError::InvalidParams(
                "parallelism must be at least 1".to_string(),
            ));
        }
        let params = Self {
            time_cost,
            memory_kib,
            parallelism,
        };
        if !params.within_ceilings() {
            return Err(PasswordHashError::InvalidParams(format!(
                "parameters exceed the supported maximum (t<={MAX_TIME_COST}, \
                 m<={MAX_MEMORY_KIB}, p<={MAX_PARALLELISM})"
            )));
        }
        // Let argon2 apply its own consistency rules (m >= 8p etc.)
        params.hasher()?;
        Ok(params)
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    fn within_ceilings(&self) -> bool {
        self.time_cost <= MAX_TIME_COST
            && self.memory_kib <= MAX_MEMORY_KIB
            && self.parallelism <= MAX_PARALLELISM
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordHashError> {
        let params = Params::new(
            self.memory_kib,
            self.time_cost,
            self.parallelism,
            Some(DIGEST_LEN),
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            time_cost: MIN_TIME_COST,
            memory_kib: MIN_MEMORY_KIB,
            parallelism: MIN_PARALLELISM,
        }
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// - NFKC-normalized, so visually identical input hashes identically
/// - Not `Clone`, Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and validate a password: 8 to 64 characters, not blank,
    /// no control characters other than space, tab and newline.
    pub fn new(mut raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized = Self(raw.nfkc().collect());
        raw.zeroize();

        if normalized.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Code points, not bytes
        let char_count = normalized.0.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(normalized)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Encoded Hash
// ============================================================================

/// A stored hash that passed [`FromStr`]: argon2id, version 19, parameters
/// `m,t,p` in that order and within the ceilings, canonical base64 salt and
/// digest.
///
/// `Display` produces the storage string unchanged.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedHash {
    phc: String,
    params: Argon2Params,
}

impl EncodedHash {
    /// A well-formed hash that no password matches in practice.
    ///
    /// Verifying against it costs the same as a real verification under
    /// `params`. Used when a username does not exist, so that an unknown user
    /// and a wrong password take the same time.
    pub fn timing_decoy(params: &Argon2Params) -> Result<Self, PasswordHashError> {
        let mut block = ParamsString::new();
        block.add_decimal("m", params.memory_kib).map_err(hashing_failed)?;
        block.add_decimal("t", params.time_cost).map_err(hashing_failed)?;
        block.add_decimal("p", params.parallelism).map_err(hashing_failed)?;
        let salt = SaltString::encode_b64(&[0u8; SALT_LEN]).map_err(hashing_failed)?;

        let decoy = PasswordHash {
            algorithm: Algorithm::Argon2id.ident(),
            version: Some(Version::V0x13 as u32),
            params: block,
            salt: Some(salt.as_salt()),
            hash: Some(Output::new(&[0u8; DIGEST_LEN]).map_err(hashing_failed)?),
        };
        Ok(Self {
            phc: decoy.to_string(),
            params: *params,
        })
    }

    pub fn params(&self) -> &Argon2Params {
        &self.params
    }

    /// Recompute the digest with the embedded parameters and compare in
    /// constant time.
    pub fn verify(&self, password: &ClearTextPassword) -> Result<bool, PasswordHashError> {
        let hash = PasswordHash::new(&self.phc)
            .map_err(|_| PasswordHashError::MalformedHash("not a PHC string"))?;
        let params =
            Params::try_from(&hash).map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        match Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .verify_password(password.as_bytes(), &hash)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(hashing_failed(e)),
        }
    }
}

impl fmt::Display for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phc)
    }
}

impl fmt::Debug for EncodedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedHash")
            .field("params", &self.params)
            .field("digest", &"[HASH]")
            .finish()
    }
}

impl FromStr for EncodedHash {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PasswordHashError::MalformedHash;

        let hash = PasswordHash::new(s).map_err(|_| MalformedHash("not a PHC string"))?;
        if hash.algorithm != Algorithm::Argon2id.ident() {
            return Err(MalformedHash("algorithm must be argon2id"));
        }
        if hash.version != Some(Version::V0x13 as u32) {
            return Err(MalformedHash("version must be v=19"));
        }

        let params = stored_params(&hash.params)?;
        if !params.within_ceilings() {
            return Err(MalformedHash("parameters exceed the supported maximum"));
        }

        let salt = hash.salt.ok_or(MalformedHash("missing salt"))?;
        let mut salt_buf = [0u8; Salt::MAX_LENGTH];
        let salt_len = salt
            .decode_b64(&mut salt_buf)
            .map_err(|_| MalformedHash("salt is not valid base64"))?
            .len();
        if !STORED_SALT_LEN.contains(&salt_len) {
            return Err(MalformedHash("salt length out of range"));
        }

        // Output enforces 10..=64 digest bytes while parsing
        if hash.hash.is_none() {
            return Err(MalformedHash("missing digest"));
        }

        // Catches combinations argon2 itself refuses (e.g. m < 8p)
        Params::try_from(&hash).map_err(|_| MalformedHash("inconsistent parameters"))?;

        // Non-canonical base64 decodes but re-encodes differently
        if hash.to_string() != s {
            return Err(MalformedHash("hash is not in canonical form"));
        }

        Ok(Self {
            phc: s.to_string(),
            params,
        })
    }
}

/// Exactly `m=<m>,t=<t>,p=<p>`, in that order.
fn stored_params(block: &ParamsString) -> Result<Argon2Params, PasswordHashError> {
    let mut entries = block.iter();
    let mut next = |key: &str| {
        entries
            .next()
            .filter(|(ident, _)| ident.as_str() == key)
            .and_then(|(_, value)| parse_decimal(value.as_str()))
            .ok_or(PasswordHashError::MalformedHash(
                "parameter block must be m=<m>,t=<t>,p=<p>",
            ))
    };
    let memory_kib = next("m")?;
    let time_cost = next("t")?;
    let parallelism = next("p")?;
    if entries.next().is_some() {
        return Err(PasswordHashError::MalformedHash(
            "unexpected extra parameters",
        ));
    }
    if time_cost == 0 || parallelism == 0 {
        return Err(PasswordHashError::MalformedHash("zero cost parameter"));
    }
    Ok(Argon2Params {
        time_cost,
        memory_kib,
        parallelism,
    })
}

/// ASCII digits without a sign or leading zeros. `str::parse` alone would
/// take `+19456` and `019456`.
fn parse_decimal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn hashing_failed(e: password_hash::Error) -> PasswordHashError {
    PasswordHashError::HashingFailed(e.to_string())
}

// ============================================================================
// Operations
// ============================================================================

/// Hash `password` under `params` with a fresh random salt.
pub fn hash_password(
    password: &ClearTextPassword,
    params: &Argon2Params,
) -> Result<EncodedHash, PasswordHashError> {
    let salt_bytes: [u8; SALT_LEN] = crypto::random_array()?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(hashing_failed)?;
    let phc = params
        .hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(hashing_failed)?
        .to_string();

    Ok(EncodedHash {
        phc,
        params: *params,
    })
}

/// Parse `encoded` and check `password` against it.
///
/// `Ok(false)` means a well-formed hash that does not match. A hash that
/// cannot be parsed is an error, never a silent mismatch.
pub fn verify_password(
    password: &ClearTextPassword,
    encoded: &str,
) -> Result<bool, PasswordHashError> {
    encoded.parse::<EncodedHash>()?.verify(password)
}

// ============================================================================
// Tests
// ============================================================================
