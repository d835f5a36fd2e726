//! Cookie Management Infrastructure
//!
//! Set-Cookie construction, cookie extraction, and HMAC-signed cookie values
//! (`<value>.<base64url(hmac)>`).

use axum::http::{HeaderMap, HeaderValue, header};

use crate::crypto::{from_base64_url, hmac_sha256, to_base64_url, verify_hmac_sha256};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
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
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }

        cookie
    }

    /// Build Set-Cookie header for deletion (expired)
    ///
    /// Keeps the same attributes so the browser matches the original cookie.
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name, self.path
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie
    }

    /// Set-Cookie header value carrying `value`
    pub fn set_cookie_header(&self, value: &str) -> HeaderValue {
        HeaderValue::from_str(&self.build_set_cookie(value))
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    /// Set-Cookie header value expiring this cookie
    pub fn delete_cookie_header(&self) -> HeaderValue {
        HeaderValue::from_str(&self.build_delete_cookie())
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Extract a cookie value from headers
///
/// Every `Cookie` header is scanned; the first matching name wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Sign a cookie value: `<value>.<base64url(hmac_sha256(secret, value))>`
pub fn sign_value(secret: &[u8], value: &str) -> String {
    let signature = hmac_sha256(secret, value.as_bytes());
    format!("{}.{}", value, to_base64_url(&signature))
}

/// Verify a signed cookie value and return the inner value
///
/// Returns `None` for unsigned, truncated or tampered values.
pub fn unsign_value(secret: &[u8], signed: &str) -> Option<String> {
    let (value, signature) = signed.rsplit_once('.')?;
    let signature = from_base64_url(signature).ok()?;
    verify_hmac_sha256(secret, value.as_bytes(), &signature).then(|| value.to_string())
}

/// Extract and verify a signed cookie
pub fn extract_signed_cookie(headers: &HeaderMap, name: &str, secret: &[u8]) -> Option<String> {
    extract_cookie(headers, name).and_then(|signed| unsign_value(secret, &signed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"cookie-secret-for-tests-32-bytes";

    #[test]
    fn test_cookie_config_build() {
        let config = CookieConfig {
            name: "csrf_token".to_string(),
            secure: true,
            http_only: false,
            same_site: SameSite::Strict,
            path: "/".to_string(),
            max_age_secs: Some(3600),
        };

        let cookie = config.build_set_cookie("value123");
        assert!(cookie.starts_with("csrf_token=value123"));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_delete_cookie_keeps_attributes() {
        let config = CookieConfig {
            name: "session".to_string(),
            path: "/api".to_string(),
            ..CookieConfig::default()
        };
        let cookie = config.build_delete_cookie();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Path=/api"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc123; empty="),
        );
        headers.append(header::COOKIE, HeaderValue::from_static("late=1"));

        assert_eq!(extract_cookie(&headers, "session"), Some("abc123".to_string()));
        assert_eq!(extract_cookie(&headers, "late"), Some("1".to_string()));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_signed_value_roundtrip() {
        let signed = sign_value(SECRET, "header.payload");
        assert_eq!(unsign_value(SECRET, &signed), Some("header.payload".to_string()));
    }

    #[test]
    fn test_signed_value_rejects_tampering() {
        let signed = sign_value(SECRET, "user-1");
        let tampered = signed.replacen("user-1", "user-2", 1);
        assert_eq!(unsign_value(SECRET, &tampered), None);
        assert_eq!(unsign_value(b"another-secret", &signed), None);
        assert_eq!(unsign_value(SECRET, "user-1"), None);
    }

    #[test]
    fn test_extract_signed_cookie() {
        let mut headers = HeaderMap::new();
        let cookie = format!("session={}", sign_value(SECRET, "token"));
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        assert_eq!(
            extract_signed_cookie(&headers, "session", SECRET),
            Some("token".to_string())
        );
        assert_eq!(extract_signed_cookie(&headers, "session", b"wrong"), None);
    }
}
