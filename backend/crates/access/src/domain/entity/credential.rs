//! Credential Entity
//!
//! Identity-provider account: the Argon2id hash and the pending password
//! reset, if any. Stored under the owner's user id.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::constant_time_eq;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Email, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub user_id: UserId,
    pub email: Email,
    /// PHC string
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_expires_at_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(user_id: UserId, email: Email, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            password_hash,
            reset_token_hash: None,
            reset_expires_at_ms: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a reset token digest; replaces any earlier pending reset
    pub fn start_reset(&mut self, token_hash: String, ttl: Duration) {
        let now = Utc::now();
        self.reset_token_hash = Some(token_hash);
        self.reset_expires_at_ms = Some((now + ttl).timestamp_millis());
        self.updated_at = now;
    }

    pub fn reset_is_valid(&self, token_hash: &str) -> bool {
        match (&self.reset_token_hash, self.reset_expires_at_ms) {
            (Some(stored), Some(expires_at_ms)) => {
                Utc::now().timestamp_millis() < expires_at_ms
                    && constant_time_eq(stored.as_bytes(), token_hash.as_bytes())
            }
            _ => false,
        }
    }

    /// Install the new hash and burn the reset token
    pub fn complete_reset(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.reset_token_hash = None;
        self.reset_expires_at_ms = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new(
            UserId::from_string("u-1"),
            Email::new("user@example.com").unwrap(),
            "$argon2id$placeholder".to_string(),
        )
    }

    #[test]
    fn test_reset_token_lifecycle() {
        let mut credential = credential();
        assert!(!credential.reset_is_valid("digest"));

        credential.start_reset("digest".to_string(), Duration::minutes(30));
        assert!(credential.reset_is_valid("digest"));
        assert!(!credential.reset_is_valid("other"));

        credential.complete_reset("$argon2id$new".to_string());
        assert!(!credential.reset_is_valid("digest"));
        assert_eq!(credential.password_hash, "$argon2id$new");
    }

    #[test]
    fn test_expired_reset_token() {
        let mut credential = credential();
        credential.start_reset("digest".to_string(), Duration::milliseconds(-1));
        assert!(!credential.reset_is_valid("digest"));
    }
}
