//! Server Configuration
//!
//! Everything the process needs at start-up, read from the environment
//! (after `.env` has been loaded). Invalid values abort start-up.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;
use axum::http::HeaderValue;
use platform::password::Argon2Params;

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    /// Longest a request waits for a pooled connection
    pub database_acquire_timeout: Duration,
    pub request_timeout: Duration,
    pub frontend_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let session_ttl_days: u64 = parse_or(&lookup, "SESSION_TTL_DAYS", 30)?;
        if session_ttl_days == 0 {
            bail!("SESSION_TTL_DAYS must be at least 1");
        }

        let argon2 = Argon2Params::new(
            parse_or(&lookup, "ARGON2_TIME_COST", 2)?,
            parse_or(&lookup, "ARGON2_MEMORY_KIB", 19456)?,
            parse_or(&lookup, "ARGON2_PARALLELISM", 1)?,
        )
        .context("invalid Argon2 parameters")?;

        let auth = AuthConfig {
            session_ttl: Duration::from_secs(session_ttl_days * 24 * 3600),
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", true)?,
            argon2,
            ..AuthConfig::default()
        };

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin
                    .parse()
                    .with_context(|| format!("invalid origin in FRONTEND_ORIGINS: {origin}"))
            })
            .collect::<anyhow::Result<Vec<HeaderValue>>>()?;

        Ok(Self {
            database_url,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            database_acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 15)?),
            frontend_origins,
            auth,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/auth")]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.frontend_origins.len(), 2);
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.session_ttl, Duration::from_secs(30 * 24 * 3600));
        assert_eq!(config.auth.argon2, Argon2Params::default());
    }

    #[test]
    fn test_database_url_is_required() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/auth"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("COOKIE_SECURE", "false"),
            ("SESSION_TTL_DAYS", "7"),
            ("ARGON2_TIME_COST", "3"),
            ("FRONTEND_ORIGINS", "https://app.example.com"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.auth.session_ttl, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.auth.argon2.time_cost(), 3);
        assert_eq!(
            config.frontend_origins,
            [HeaderValue::from_static("https://app.example.com")]
        );
    }

    #[test]
    fn test_rejects_weak_or_invalid_values() {
        let base = ("DATABASE_URL", "postgres://localhost/auth");
        assert!(config_from(&[base, ("ARGON2_TIME_COST", "1")]).is_err());
        assert!(config_from(&[base, ("ARGON2_MEMORY_KIB", "1024")]).is_err());
        assert!(config_from(&[base, ("SESSION_TTL_DAYS", "0")]).is_err());
        assert!(config_from(&[base, ("REQUEST_TIMEOUT_SECS", "soon")]).is_err());
    }
}
