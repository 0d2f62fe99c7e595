//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entity::{auth_session::AuthSession, credential::Credential, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    session_id::SessionId, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE 23505 on any unique index.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user_name: &UserName, password_hash: &UserPassword) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, sign_up_date, is_active
            "#,
        )
        .bind(user_name.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UsernameTaken
            } else {
                AuthError::Storage(e)
            }
        })?;

        Ok(row.into_user())
    }

    async fn find_active_credential(&self, user_name: &UserName) -> AuthResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, username, password_hash, sign_up_date, is_active
            FROM users
            WHERE username = $1 AND is_active
            "#,
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CredentialRow::into_credential))
    }

    async fn set_active(&self, user_id: UserId, active: bool) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id.as_i64())
            .bind(active)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(user_id = %user_id, active, "User activation changed");

        Ok(updated > 0)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<AuthSession> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (session_id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING session_id, user_id, expires_at, created_at
            "#,
        )
        .bind(session_id.as_str())
        .bind(user_id.as_i64())
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::SessionIdCollision
            } else {
                AuthError::Storage(e)
            }
        })?;

        Ok(row.into_session())
    }

    async fn find_valid(&self, session_id: &SessionId) -> AuthResult<Option<(User, AuthSession)>> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r#"
            SELECT
                s.session_id,
                s.user_id,
                s.expires_at,
                s.created_at,
                u.username,
                u.sign_up_date,
                u.is_active
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_id = $1
              AND s.expires_at > now()
              AND u.is_active
            "#,
        )
        .bind(session_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionUserRow::into_pair))
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    sign_up_date: DateTime<Utc>,
    is_active: bool,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_i64(self.id),
            user_name: UserName::from_db(self.username),
            signed_up_at: self.sign_up_date,
            is_active: self.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    password_hash: String,
    sign_up_date: DateTime<Utc>,
    is_active: bool,
}

impl CredentialRow {
    fn into_credential(self) -> Credential {
        Credential {
            user: User {
                user_id: UserId::from_i64(self.id),
                user_name: UserName::from_db(self.username),
                signed_up_at: self.sign_up_date,
                is_active: self.is_active,
            },
            password_hash: UserPassword::from_db(self.password_hash),
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: SessionId::from_db(self.session_id),
            user_id: UserId::from_i64(self.user_id),
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionUserRow {
    session_id: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    username: String,
    sign_up_date: DateTime<Utc>,
    is_active: bool,
}

impl SessionUserRow {
    fn into_pair(self) -> (User, AuthSession) {
        let user_id = UserId::from_i64(self.user_id);
        let user = User {
            user_id,
            user_name: UserName::from_db(self.username),
            signed_up_at: self.sign_up_date,
            is_active: self.is_active,
        };
        let session = AuthSession {
            session_id: SessionId::from_db(self.session_id),
            user_id,
            expires_at: self.expires_at,
            created_at: self.created_at,
        };
        (user, session)
    }
}

// ============================================================================
// Tests
// ============================================================================

/// Run against a scratch database with
/// `DATABASE_URL=postgres://... cargo test -p auth -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> UserName {
        UserName::new(s).unwrap()
    }

    fn stored_hash() -> UserPassword {
        UserPassword::from_db("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$ZGlnZXN0".to_string())
    }

    async fn signed_up(repo: &PgAuthRepository, user_name: &str) -> User {
        repo.create(&name(user_name), &stored_hash()).await.unwrap()
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_find_credential(pool: PgPool) {
        let repo = PgAuthRepository::new(pool);
        let user = signed_up(&repo, "alice").await;
        assert!(user.is_active);
        assert_eq!(user.user_name.as_str(), "alice");

        let credential = repo
            .find_active_credential(&name("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.user.user_id, user.user_id);
        assert_eq!(credential.password_hash.as_str(), stored_hash().as_str());

        assert!(repo.find_active_credential(&name("bob")).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_duplicate_name_is_taken(pool: PgPool) {
        let repo = PgAuthRepository::new(pool);
        signed_up(&repo, "alice").await;

        let err = repo.create(&name("alice"), &stored_hash()).await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_inactive_user_has_no_credential_or_session(pool: PgPool) {
        let repo = PgAuthRepository::new(pool);
        let user = signed_up(&repo, "alice").await;
        let session_id = SessionId::generate().unwrap();
        repo.insert(&session_id, user.user_id, Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(repo.find_valid(&session_id).await.unwrap().is_some());

        assert!(repo.set_active(user.user_id, false).await.unwrap());
        assert!(repo.find_active_credential(&name("alice")).await.unwrap().is_none());
        assert!(repo.find_valid(&session_id).await.unwrap().is_none());

        assert!(repo.set_active(user.user_id, true).await.unwrap());
        let (resolved, _) = repo.find_valid(&session_id).await.unwrap().unwrap();
        assert_eq!(resolved.user_id, user.user_id);

        assert!(!repo.set_active(UserId::from_i64(i64::MAX), false).await.unwrap());
    }

    #[sqlx::test(migrations = "../../../database/migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_session_lifecycle(pool: PgPool) {
        let repo = PgAuthRepository::new(pool);
        let user = signed_up(&repo, "alice").await;

        let live = SessionId::generate().unwrap();
        let expires_at = Utc::now() + chrono::Duration::hours(1);
        let session = repo.insert(&live, user.user_id, expires_at).await.unwrap();
        assert_eq!(session.session_id.as_str(), live.as_str());
        assert_eq!(session.user_id, user.user_id);

        let err = repo.insert(&live, user.user_id, expires_at).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionIdCollision));

        let expired = SessionId::generate().unwrap();
        repo.insert(&expired, user.user_id, Utc::now() - chrono::Duration::minutes(1))
            .await
            .unwrap();
        assert!(repo.find_valid(&expired).await.unwrap().is_none());

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert!(repo.find_valid(&live).await.unwrap().is_some());

        repo.delete(&live).await.unwrap();
        repo.delete(&live).await.unwrap();
        assert!(repo.find_valid(&live).await.unwrap().is_none());
    }
}
