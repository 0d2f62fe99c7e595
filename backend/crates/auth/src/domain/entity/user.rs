//! User Entity
//!
//! The identity handed to the rest of the application. Carries no password
//! material; that lives in [`Credential`](super::credential::Credential).

use chrono::{DateTime, Utc};

use crate::domain::value_object::{user_id::UserId, user_name::UserName};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned numeric identity
    pub user_id: UserId,
    /// Unique, case-sensitive login handle
    pub user_name: UserName,
    pub signed_up_at: DateTime<Utc>,
    /// Inactive users never authenticate and their sessions never resolve
    pub is_active: bool,
}
