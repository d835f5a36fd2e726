//! Client identification utilities
//!
//! A browser context is identified by the SHA-256 of its User-Agent.
//! Identity-provider sessions are bound to that fingerprint so a second
//! login from the same browser can be detected.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, header};
use std::net::{IpAddr, SocketAddr};

use crate::crypto::{sha256, to_base64_url};

/// Client fingerprint derived from request headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFingerprint {
    /// SHA-256 hash of the User-Agent header
    pub hash: [u8; 32],
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// Original User-Agent string (for logging/display)
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(hash: [u8; 32], ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            hash,
            ip,
            user_agent,
        }
    }

    /// Fingerprint for a known User-Agent string
    pub fn from_user_agent(user_agent: &str, ip: Option<IpAddr>) -> Self {
        Self::new(
            sha256(user_agent.as_bytes()),
            ip,
            Some(user_agent.to_string()),
        )
    }

    /// Hash as URL-safe base64 (document field / lookup key)
    pub fn key(&self) -> String {
        to_base64_url(&self.hash)
    }

    /// Get IP as string (for storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Error when extracting client fingerprint
#[derive(Debug, Clone, thiserror::Error)]
pub enum FingerprintError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Extract client fingerprint from request headers
///
/// ## Returns
/// * `Err(FingerprintError)` - Missing or non-ASCII User-Agent header
pub fn extract_fingerprint(
    headers: &HeaderMap,
    client_ip: Option<IpAddr>,
) -> Result<ClientFingerprint, FingerprintError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FingerprintError::MissingHeader("User-Agent".to_string()))?;

    Ok(ClientFingerprint::from_user_agent(user_agent, client_ip))
}

/// Extract the client IP address
///
/// X-Forwarded-For (first entry) wins over the direct connection address,
/// which is only present when the server runs with `ConnectInfo`.
pub fn extract_client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_fingerprint() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let fp = extract_fingerprint(&headers, None).unwrap();
        assert_eq!(fp.hash, sha256(b"Mozilla/5.0 Test Browser"));
        assert_eq!(fp.user_agent.as_deref(), Some("Mozilla/5.0 Test Browser"));
        assert_eq!(fp.key(), ClientFingerprint::from_user_agent("Mozilla/5.0 Test Browser", None).key());
    }

    #[test]
    fn test_extract_fingerprint_missing_ua() {
        let headers = HeaderMap::new();
        let result = extract_fingerprint(&headers, None);
        assert!(matches!(result, Err(FingerprintError::MissingHeader(_))));

        let mut blank = HeaderMap::new();
        blank.insert(header::USER_AGENT, HeaderValue::from_static("  "));
        assert!(extract_fingerprint(&blank, None).is_err());
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, &Extensions::new());
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_connect_info() {
        let headers = HeaderMap::new();
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        extensions.insert(ConnectInfo(addr));

        assert_eq!(
            extract_client_ip(&headers, &extensions),
            Some("127.0.0.1".parse().unwrap())
        );
        assert_eq!(extract_client_ip(&headers, &Extensions::new()), None);
    }
}
