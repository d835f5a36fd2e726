//! Application Configuration
//!
//! Configuration for the access application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::domain::entity::session_settings::SessionLifetimes;
use crate::domain::token::TokenSigner;
use crate::error::{AccessError, AccessResult};

/// Access application configuration
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Signed cookie carrying the bearer token
    pub session_cookie_name: String,
    /// Signed cookie carrying the refresh token
    pub refresh_cookie_name: String,
    /// Double-submit CSRF cookie (readable by scripts)
    pub csrf_cookie_name: String,
    /// Query parameter the CSRF token is submitted in
    pub csrf_param: String,
    /// Paths (relative to the access router) exempt from CSRF validation
    pub csrf_exempt_paths: Vec<String>,
    /// HMAC key for signed cookies (32 bytes)
    pub cookie_secret: [u8; 32],
    /// HMAC key for bearer tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Default bearer / session cookie lifetime (1 hour)
    pub session_ttl: Duration,
    /// Default refresh token lifetime (7 days)
    pub refresh_ttl: Duration,
    /// Password reset token lifetime (30 minutes)
    pub reset_token_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy for the session and refresh cookies
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            refresh_cookie_name: "refresh_token".to_string(),
            csrf_cookie_name: "csrf_token".to_string(),
            csrf_param: "_csrf".to_string(),
            csrf_exempt_paths: ["/auth/login", "/auth/signup", "/auth/recover", "/auth/recover/confirm"]
                .into_iter()
                .map(String::from)
                .collect(),
            cookie_secret: [0u8; 32],
            token_secret: [0u8; 32],
            session_ttl: Duration::from_secs(3600),               // 1 hour
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),      // 1 week
            reset_token_ttl: Duration::from_secs(30 * 60),        // 30 minutes
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AccessConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut cookie_secret = [0u8; 32];
        let mut token_secret = [0u8; 32];
        rand::rng().fill_bytes(&mut cookie_secret);
        rand::rng().fill_bytes(&mut token_secret);
        Self {
            cookie_secret,
            token_secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Parse a 32-byte secret from URL-safe base64 (no padding)
    pub fn parse_secret(encoded: &str) -> AccessResult<[u8; 32]> {
        let bytes = platform::crypto::from_base64_url(encoded.trim())
            .map_err(|e| AccessError::Validation(format!("Secret is not valid base64: {e}")))?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            AccessError::Validation(format!("Secret must be 32 bytes (got {})", bytes.len()))
        })
    }

    pub fn token_signer(&self) -> TokenSigner {
        TokenSigner::new(self.token_secret)
    }

    pub fn default_lifetimes(&self) -> SessionLifetimes {
        SessionLifetimes {
            session: self.session_ttl,
            refresh: self.refresh_ttl,
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn is_csrf_exempt(&self, path: &str) -> bool {
        self.csrf_exempt_paths.iter().any(|exempt| exempt == path)
    }

    pub fn session_cookie(&self, max_age: Duration) -> CookieConfig {
        self.cookie(&self.session_cookie_name, true, self.cookie_same_site, max_age)
    }

    pub fn refresh_cookie(&self, max_age: Duration) -> CookieConfig {
        self.cookie(&self.refresh_cookie_name, true, self.cookie_same_site, max_age)
    }

    /// Not HttpOnly: the client reads it to echo the token back
    pub fn csrf_cookie(&self, max_age: Duration) -> CookieConfig {
        self.cookie(&self.csrf_cookie_name, false, SameSite::Strict, max_age)
    }

    fn cookie(&self, name: &str, http_only: bool, same_site: SameSite, max_age: Duration) -> CookieConfig {
        CookieConfig {
            name: name.to_string(),
            secure: self.cookie_secure,
            http_only,
            same_site,
            path: "/".to_string(),
            max_age_secs: Some(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AccessConfig::default();
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(config.refresh_ttl, Duration::from_secs(604_800));
        assert_eq!(config.reset_token_ttl, Duration::from_secs(1800));
        assert_eq!(config.csrf_param, "_csrf");
        assert!(config.cookie_secure);
        assert!(config.is_csrf_exempt("/auth/login"));
        assert!(config.is_csrf_exempt("/auth/recover/confirm"));
        assert!(!config.is_csrf_exempt("/auth/logout"));
    }

    #[test]
    fn test_random_secrets() {
        let a = AccessConfig::with_random_secrets();
        let b = AccessConfig::with_random_secrets();
        assert_ne!(a.cookie_secret, b.cookie_secret);
        assert_ne!(a.cookie_secret, a.token_secret);
        assert!(!AccessConfig::development().cookie_secure);
    }

    #[test]
    fn test_parse_secret() {
        let encoded = platform::crypto::to_base64_url(&[5u8; 32]);
        assert_eq!(AccessConfig::parse_secret(&encoded).unwrap(), [5u8; 32]);

        let short = platform::crypto::to_base64_url(&[5u8; 16]);
        assert!(AccessConfig::parse_secret(&short).is_err());
        assert!(AccessConfig::parse_secret("not base64!").is_err());
    }

    #[test]
    fn test_csrf_cookie_is_script_readable() {
        let config = AccessConfig::default();
        let cookie = config.csrf_cookie(Duration::from_secs(60)).build_set_cookie("t");
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        let session = config.session_cookie(Duration::from_secs(60)).build_set_cookie("t");
        assert!(session.contains("HttpOnly"));
        assert!(session.contains("Max-Age=60"));
    }
}
