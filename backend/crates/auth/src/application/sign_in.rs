//! Sign In Use Case
//!
//! Authenticates a user and creates a session.

use std::sync::Arc;

use chrono::Utc;
use platform::cookie::Cookie;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_id::SessionId,
    user_id::UserId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub user_name: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user: User,
    pub session: AuthSession,
    /// `Set-Cookie` for the new session
    pub cookie: Cookie,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let user = self.authenticate(&input.user_name, input.password).await?;
        let session = self.create_session(user.user_id).await?;
        let cookie = self.config.session_cookie(&session);

        tracing::info!(
            user_id = %user.user_id,
            session = session.session_id.log_prefix(),
            expires_at = %session.expires_at,
            "User signed in"
        );

        Ok(SignInOutput {
            user,
            session,
            cookie,
        })
    }

    /// Check a username and password.
    ///
    /// Every failure is `InvalidCredentials`. An unknown or inactive user
    /// still pays for one Argon2id verification against a decoy hash, so the
    /// response time does not reveal whether the name exists.
    pub async fn authenticate(&self, user_name: &str, password: String) -> AuthResult<User> {
        // Input that could never have been registered cannot match anyone
        let (Ok(user_name), Ok(raw_password)) = (UserName::new(user_name), RawPassword::new(password))
        else {
            return Err(AuthError::InvalidCredentials);
        };

        let Some(credential) = self.user_repo.find_active_credential(&user_name).await? else {
            let decoy = UserPassword::timing_decoy(&self.config.argon2)?;
            decoy.verify(raw_password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        match credential.password_hash.verify(raw_password).await {
            Ok(true) => Ok(credential.user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            // A corrupt row must not lock the process up or let anyone in
            Err(e @ AuthError::MalformedHash(_)) => {
                e.log();
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    /// Insert a session with a fresh random ID, expiring one TTL from now.
    pub async fn create_session(&self, user_id: UserId) -> AuthResult<AuthSession> {
        let ttl = chrono::Duration::from_std(self.config.session_ttl)
            .map_err(|e| AuthError::Internal(format!("session TTL out of range: {e}")))?;
        let expires_at = Utc::now() + ttl;

        for attempt in 1..=self.config.session_id_attempts.max(1) {
            let session_id = SessionId::generate()?;
            match self.session_repo.insert(&session_id, user_id, expires_at).await {
                Err(AuthError::SessionIdCollision) => {
                    tracing::warn!(attempt, "Session ID collision, regenerating");
                }
                result => return result,
            }
        }

        Err(AuthError::SessionIdCollision)
    }
}
