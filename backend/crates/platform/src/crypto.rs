//! Cryptographic Utilities
//!
//! Every secret in the system (password salts, session tokens) is drawn from
//! the operating system CSPRNG through [`fill_random`]. Entropy failure is an
//! error, never a silent fallback.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// The OS random source could not produce bytes.
#[derive(Debug, Error)]
#[error("secure randomness unavailable: {0}")]
pub struct RandomnessError(#[from] rand::Error);

/// Fill `buf` from the OS CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), RandomnessError> {
    OsRng.try_fill_bytes(buf)?;
    Ok(())
}

/// Fixed-size variant of [`fill_random`].
pub fn random_array<const N: usize>() -> Result<[u8; N], RandomnessError> {
    let mut bytes = [0u8; N];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// URL-safe alphabet, no padding. Used for values that travel in cookies.
pub fn to_base64_url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn from_base64_url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_array_is_not_constant() {
        let a: [u8; 16] = random_array().unwrap();
        let b: [u8; 16] = random_array().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_url_alphabet_has_no_padding_or_specials() {
        let encoded = to_base64_url(&[0xfb, 0xff, 0xfe, 0x00]);
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(from_base64_url(&encoded).unwrap(), vec![0xfb, 0xff, 0xfe, 0x00]);
    }
}
