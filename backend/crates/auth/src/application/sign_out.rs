//! Sign Out Use Case
//!
//! Invalidates a user session.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_id::SessionId;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Delete the session behind `session_token`. Succeeds when there is
    /// nothing to delete, including tokens that cannot name a session.
    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        let Some(session_id) = SessionId::parse(session_token) else {
            return Ok(());
        };
        self.session_repo.delete(&session_id).await?;

        tracing::info!(session = session_id.log_prefix(), "User signed out");
        Ok(())
    }
}
