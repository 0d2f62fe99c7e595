//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the domain crates:
//! - Cryptographic utilities (OS randomness, URL-safe Base64)
//! - Password hashing (Argon2id in PHC string format)
//! - Cookie construction and extraction

pub mod cookie;
pub mod crypto;
pub mod password;
