//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, router, session middleware
//!
//! ## Features
//! - Sign up and login with username + password
//! - Server-side sessions carried in an opaque cookie
//! - Per-request session resolution with anonymous fallback
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, parameters stored with each hash
//! - Login failures are indistinguishable, including in timing
//! - Session IDs are 128 random bits from the OS
//! - Cookies are `Secure`, `HttpOnly`, `SameSite=Strict`
//! - Deactivating a user invalidates all of their sessions at once

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, SESSION_COOKIE_NAME};
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthRepository, PgAuthRepository};
pub use presentation::middleware::CurrentUser;
pub use presentation::router::{auth_router, session_layer};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
