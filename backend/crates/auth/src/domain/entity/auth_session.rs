//! Auth Session Entity
//!
//! Server-side record behind a session cookie. Valid only while
//! `now < expires_at` and the owning user is active. Both conditions are
//! checked by the store at read time, not by a background job.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{session_id::SessionId, user_id::UserId};

/// Auth session entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    /// Set by the store on insert
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let session = AuthSession {
            session_id: SessionId::generate().unwrap(),
            user_id: UserId::from_i64(1),
            expires_at: now,
            created_at: now - Duration::days(1),
        };
        assert!(session.is_expired_at(now));
        assert!(!session.is_expired_at(now - Duration::seconds(1)));
    }
}
