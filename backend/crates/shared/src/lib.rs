//! Shared Kernel - the vocabulary every backend crate agrees on
//!
//! - The unified error type ([`error::app_error::AppError`]) and its
//!   classification ([`error::kind::ErrorKind`])
//! - Typed numeric identifiers ([`id::Id`])
//!
//! Anything that lives here should mean the same thing in every domain.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
