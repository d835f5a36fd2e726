//! Identity Provider Session Entity
//!
//! A live login at the identity provider, bound to the browser context
//! (User-Agent fingerprint) it was opened from. The refresh token is only
//! stored as a digest.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Email, IdpSessionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpSession {
    pub id: IdpSessionId,
    pub user_id: UserId,
    pub email: Email,
    /// URL-safe base64 of the client fingerprint hash
    pub fingerprint: String,
    pub refresh_token_hash: String,
    /// Lifetime of each bearer token issued for this session
    pub bearer_ttl_secs: i64,
    /// End of the refresh window (Unix timestamp ms)
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl IdpSession {
    /// TTLs are supplied by the session service, not hard-coded here
    pub fn new(
        user_id: UserId,
        email: Email,
        fingerprint: String,
        refresh_token_hash: String,
        bearer_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IdpSessionId::new(),
            user_id,
            email,
            fingerprint,
            refresh_token_hash,
            bearer_ttl_secs: bearer_ttl.num_seconds(),
            expires_at_ms: (now + refresh_ttl).timestamp_millis(),
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn remaining_ms(&self) -> i64 {
        (self.expires_at_ms - Utc::now().timestamp_millis()).max(0)
    }

    pub fn bearer_ttl(&self) -> Duration {
        Duration::seconds(self.bearer_ttl_secs)
    }

    pub fn rotate_refresh_token(&mut self, refresh_token_hash: String) {
        self.refresh_token_hash = refresh_token_hash;
        self.touch();
    }
}
