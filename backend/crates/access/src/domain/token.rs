//! Session Token
//!
//! Bearer token issued by the identity provider:
//! `<base64url(json claims)>.<base64url(hmac_sha256(token_secret, payload))>`.
//!
//! The token travels inside the HMAC-signed session cookie. Guards read the
//! claims with [`decode_unverified`]; the cookie signature is what they trust.

use chrono::{DateTime, Utc};
use platform::crypto::{from_base64_url, hmac_sha256, to_base64_url};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_object::{Email, IdpSessionId, UserId};
use crate::error::{AccessError, AccessResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (subject)
    pub id: String,
    pub email: String,
    /// Identity-provider session id
    pub sid: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        user_id: &UserId,
        email: &Email,
        session_id: &IdpSessionId,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            id: user_id.to_string(),
            email: email.to_string(),
            sid: session_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.id.clone())
    }

    pub fn session_id(&self) -> IdpSessionId {
        IdpSessionId::from_string(self.sid.clone())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.exp.saturating_mul(1000)
    }
}

/// Signs bearer tokens with the identity provider's secret
#[derive(Clone)]
pub struct TokenSigner {
    secret: [u8; 32],
}

impl TokenSigner {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    pub fn issue(&self, claims: &SessionClaims) -> AccessResult<String> {
        let payload = to_base64_url(&serde_json::to_vec(claims)?);
        let signature = hmac_sha256(&self.secret, payload.as_bytes());
        Ok(format!("{}.{}", payload, to_base64_url(&signature)))
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Read the claims without checking the token signature
pub fn decode_unverified(token: &str) -> AccessResult<SessionClaims> {
    let (payload, _) = token.split_once('.').ok_or(AccessError::InvalidToken)?;
    decode_payload(payload)
}

fn decode_payload(payload: &str) -> AccessResult<SessionClaims> {
    let bytes = from_base64_url(payload).map_err(|_| AccessError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AccessError::InvalidToken)
}
