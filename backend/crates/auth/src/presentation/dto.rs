//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{auth_session::AuthSession, user::User};

// ============================================================================
// Requests
// ============================================================================

/// Sign up request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub user_name: String,
    pub password: String,
}

/// Login request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

// Passwords stay out of request logs
impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_name", &self.user_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub user_name: String,
    pub signed_up_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.as_i64(),
            user_name: user.user_name.to_string(),
            signed_up_at: user.signed_up_at,
            is_active: user.is_active,
        }
    }
}

/// The caller's identity and when their session ends.
///
/// The session ID itself is never echoed back; it only travels in the cookie.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

impl SessionResponse {
    pub fn new(user: &User, session: &AuthSession) -> Self {
        Self {
            user: user.into(),
            expires_at: session.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_debug_hides_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"userName":"alice","password":"Secret123"}"#).unwrap();
        assert_eq!(req.user_name, "alice");
        let debug = format!("{req:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("Secret123"));
    }
}
