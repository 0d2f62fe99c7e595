//! Check Session Use Case
//!
//! Resolves a presented session token to the user that owns it.

use std::sync::Arc;

use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_id::SessionId;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// `SessionNotFound` covers a malformed token, an unknown ID, an expired
    /// session and a deactivated owner alike.
    pub async fn resolve(&self, session_token: &str) -> AuthResult<(User, AuthSession)> {
        let session_id = SessionId::parse(session_token).ok_or(AuthError::SessionNotFound)?;

        self.session_repo
            .find_valid(&session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)
    }
}
