//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::{Cookie, CookieConfig};
use platform::password::Argon2Params;

use crate::domain::entity::auth_session::AuthSession;

/// Cookie carrying the session ID. Shared by issuance, lookup and clearing.
pub const SESSION_COOKIE_NAME: &str = "auth_session";

/// Default session validity window (30 days)
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a session from login
    pub session_ttl: Duration,
    /// `Secure` attribute. Only disable for plain-HTTP local development.
    pub cookie_secure: bool,
    /// Cost parameters for new password hashes and the unknown-user decoy
    pub argon2: Argon2Params,
    /// Fresh session IDs to try when the store reports a collision
    pub session_id_attempts: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            cookie_secure: true,
            argon2: Argon2Params::default(),
            session_id_attempts: 3,
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Attributes of the session cookie: HttpOnly, SameSite=Strict, Path=/
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            secure: self.cookie_secure,
            ..CookieConfig::session(SESSION_COOKIE_NAME)
        }
    }

    /// Cookie for a freshly created session, expiring with it.
    pub fn session_cookie(&self, session: &AuthSession) -> Cookie {
        self.cookie()
            .issue(session.session_id.as_str(), session.expires_at)
    }

    /// Cookie instructing the browser to drop the session cookie.
    pub fn clear_cookie(&self) -> Cookie {
        self.cookie().removal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{session_id::SessionId, user_id::UserId};
    use chrono::Utc;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl.as_secs(), 2_592_000);
        assert!(config.cookie_secure);
        assert_eq!(config.argon2.time_cost(), 2);
        assert_eq!(config.argon2.memory_kib(), 19456);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let now = Utc::now();
        let session = AuthSession {
            session_id: SessionId::generate().unwrap(),
            user_id: UserId::from_i64(1),
            expires_at: now + chrono::Duration::days(30),
            created_at: now,
        };
        let cookie = AuthConfig::default().session_cookie(&session);
        let rendered = cookie.to_string();

        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), session.session_id.as_str());
        assert_eq!(cookie.expires(), Some(session.expires_at));
        for attr in ["Secure", "HttpOnly", "SameSite=Strict", "Path=/", "Expires="] {
            assert!(rendered.contains(attr), "missing {attr} in {rendered}");
        }
    }

    #[test]
    fn test_development_cookie_is_not_secure() {
        let rendered = AuthConfig::development().clear_cookie().to_string();
        assert!(!rendered.contains("Secure"));
        assert!(rendered.starts_with("auth_session=;"));
    }
}
