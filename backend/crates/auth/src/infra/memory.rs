//! In-memory Repository
//!
//! Same contract as [`PgAuthRepository`](super::postgres::PgAuthRepository):
//! uniqueness is checked and the row inserted under one lock, and session
//! reads apply the expiry and active-user filters. Used by the test-suite.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_id::SessionId, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Tables {
    last_user_id: i64,
    users: HashMap<UserName, Credential>,
    sessions: HashMap<SessionId, AuthSession>,
}

impl Tables {
    fn user_by_id(&self, user_id: UserId) -> Option<&Credential> {
        self.users.values().find(|c| c.user.user_id == user_id)
    }
}

/// Mutex-guarded maps with the same semantics as the SQL schema
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AuthError::Internal("memory store lock poisoned".to_string()))
    }

    /// Number of stored session rows, including expired and orphaned ones.
    pub fn session_count(&self) -> AuthResult<usize> {
        Ok(self.lock()?.sessions.len())
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user_name: &UserName, password_hash: &UserPassword) -> AuthResult<User> {
        let mut tables = self.lock()?;
        if tables.users.contains_key(user_name) {
            return Err(AuthError::UsernameTaken);
        }

        tables.last_user_id += 1;
        let user = User {
            user_id: UserId::from_i64(tables.last_user_id),
            user_name: user_name.clone(),
            signed_up_at: Utc::now(),
            is_active: true,
        };
        tables.users.insert(
            user_name.clone(),
            Credential {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );

        Ok(user)
    }

    async fn find_active_credential(&self, user_name: &UserName) -> AuthResult<Option<Credential>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .get(user_name)
            .filter(|c| c.user.is_active)
            .cloned())
    }

    async fn set_active(&self, user_id: UserId, active: bool) -> AuthResult<bool> {
        let mut tables = self.lock()?;
        let found = tables
            .users
            .values_mut()
            .find(|c| c.user.user_id == user_id)
            .map(|c| c.user.is_active = active)
            .is_some();
        Ok(found)
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn insert(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<AuthSession> {
        let mut tables = self.lock()?;
        if tables.sessions.contains_key(session_id) {
            return Err(AuthError::SessionIdCollision);
        }
        // Foreign key
        if tables.user_by_id(user_id).is_none() {
            return Err(AuthError::Internal(format!(
                "session references unknown user {user_id}"
            )));
        }

        let session = AuthSession {
            session_id: session_id.clone(),
            user_id,
            expires_at,
            created_at: Utc::now(),
        };
        tables.sessions.insert(session_id.clone(), session.clone());

        Ok(session)
    }

    async fn find_valid(&self, session_id: &SessionId) -> AuthResult<Option<(User, AuthSession)>> {
        let tables = self.lock()?;
        let now = Utc::now();
        let Some(session) = tables.sessions.get(session_id) else {
            return Ok(None);
        };
        if session.is_expired_at(now) {
            return Ok(None);
        }

        Ok(tables
            .user_by_id(session.user_id)
            .filter(|c| c.user.is_active)
            .map(|c| (c.user.clone(), session.clone())))
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        self.lock()?.sessions.remove(session_id);
        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}
