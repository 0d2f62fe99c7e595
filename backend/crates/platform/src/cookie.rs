//! Cookie Management Infrastructure
//!
//! A [`CookieConfig`] fixes the attributes of one cookie (name, flags, path).
//! It produces [`Cookie`] descriptors that render as `Set-Cookie` values,
//! either carrying a value with an absolute expiry or clearing it.

use std::fmt;

use axum::http::{HeaderMap, HeaderValue, header, header::InvalidHeaderValue};
use chrono::{DateTime, Utc};

/// `Expires` attribute format (RFC 7231 IMF-fixdate)
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl CookieConfig {
    /// Strict session-cookie attributes: Secure, HttpOnly, SameSite=Strict, Path=/
    pub fn session(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            path: "/".to_string(),
        }
    }

    /// Cookie carrying `value` until `expires`.
    pub fn issue(&self, value: impl Into<String>, expires: DateTime<Utc>) -> Cookie {
        Cookie {
            config: self.clone(),
            value: value.into(),
            expiry: Expiry::At(expires),
        }
    }

    /// Same name and path with an empty value, already expired.
    pub fn removal(&self) -> Cookie {
        Cookie {
            config: self.clone(),
            value: String::new(),
            expiry: Expiry::Removed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expiry {
    At(DateTime<Utc>),
    Removed,
}

/// A fully described cookie, rendered by `Display` as a `Set-Cookie` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    config: CookieConfig,
    value: String,
    expiry: Expiry,
}

impl Cookie {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        match self.expiry {
            Expiry::At(at) => Some(at),
            Expiry::Removed => None,
        }
    }

    pub fn is_removal(&self) -> bool {
        self.expiry == Expiry::Removed
    }

    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.config.name, self.value)?;
        if self.config.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.config.secure {
            f.write_str("; Secure")?;
        }
        write!(f, "; SameSite={}", self.config.same_site.as_str())?;
        write!(f, "; Path={}", self.config.path)?;
        match self.expiry {
            Expiry::At(at) => write!(f, "; Expires={}", at.format(HTTP_DATE_FORMAT)),
            Expiry::Removed => f.write_str("; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"),
        }
    }
}

/// Extract a cookie value from headers. The first occurrence wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_issue_renders_all_attributes() {
        let expires = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        let cookie = CookieConfig::session("sid").issue("abc123", expires);

        assert_eq!(
            cookie.to_string(),
            "sid=abc123; HttpOnly; Secure; SameSite=Strict; Path=/; \
             Expires=Fri, 07 Mar 2025 09:05:01 GMT"
        );
        assert_eq!(cookie.expires(), Some(expires));
        assert!(cookie.to_header_value().is_ok());
    }

    #[test]
    fn test_removal_keeps_name_and_path() {
        let config = CookieConfig {
            path: "/app".to_string(),
            ..CookieConfig::session("sid")
        };
        let cookie = config.removal();
        let rendered = cookie.to_string();

        assert!(cookie.is_removal());
        assert!(rendered.starts_with("sid=;"));
        assert!(rendered.contains("Path=/app"));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn test_insecure_config_omits_secure() {
        let config = CookieConfig {
            secure: false,
            ..CookieConfig::session("sid")
        };
        let rendered = config.removal().to_string();
        assert!(!rendered.contains("Secure"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_across_header_lines() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("session=xyz"));
        assert_eq!(extract_cookie(&headers, "session"), Some("xyz".to_string()));
    }
}
