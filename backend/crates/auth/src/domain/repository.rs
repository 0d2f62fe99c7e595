//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the infra layer.
//! Every invariant that must hold under concurrency (unique user names,
//! unique session IDs) is enforced by the store, never by a read-then-write
//! sequence in the caller.

use chrono::{DateTime, Utc};

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::value_object::{
    session_id::SessionId, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::AuthResult;

/// User directory
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user in one statement. The store assigns id, sign-up date and
    /// `is_active = true`. A duplicate name is `AuthError::UsernameTaken`.
    async fn create(&self, user_name: &UserName, password_hash: &UserPassword) -> AuthResult<User>;

    /// Look up an *active* user by exact name, with the stored hash.
    async fn find_active_credential(&self, user_name: &UserName) -> AuthResult<Option<Credential>>;

    /// Administrative activation switch. Returns whether the user exists.
    async fn set_active(&self, user_id: UserId, active: bool) -> AuthResult<bool>;
}

/// Session store
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a session. An existing ID is `AuthError::SessionIdCollision`.
    async fn insert(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<AuthSession>;

    /// Single read joining session and user, filtered on
    /// `expires_at > now` and `is_active`. Absent, expired and orphaned
    /// sessions all come back as `None`.
    async fn find_valid(&self, session_id: &SessionId) -> AuthResult<Option<(User, AuthSession)>>;

    /// Idempotent: deleting a missing session is not an error.
    async fn delete(&self, session_id: &SessionId) -> AuthResult<()>;

    /// Remove expired rows. Housekeeping only; reads already ignore them.
    async fn delete_expired(&self) -> AuthResult<u64>;
}
