//! Session Settings Entity
//!
//! Per-user overrides for bearer and refresh lifetimes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::value_object::UserId;

/// Upper bound for any override (one year)
const MAX_TTL_SECS: i64 = 366 * 24 * 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_secs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_ttl_secs: Option<i64>,
}

/// Resolved lifetimes for a new session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetimes {
    /// Bearer token / session cookie lifetime
    pub session: Duration,
    /// Refresh token lifetime
    pub refresh: Duration,
}

impl SessionSettings {
    /// Apply overrides on top of `defaults`
    ///
    /// Non-positive values are ignored, oversized ones capped at a year.
    /// The session never outlives the refresh window.
    pub fn resolve(&self, defaults: SessionLifetimes) -> SessionLifetimes {
        let positive = |secs: Option<i64>| {
            secs.filter(|secs| *secs > 0)
                .map(|secs| Duration::from_secs(secs.min(MAX_TTL_SECS).unsigned_abs()))
        };

        let refresh = positive(self.refresh_ttl_secs).unwrap_or(defaults.refresh);
        let session = positive(self.session_ttl_secs).unwrap_or(defaults.session);

        SessionLifetimes {
            session: session.min(refresh),
            refresh,
        }
    }
}

impl SessionLifetimes {
    pub fn session_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session).unwrap_or(chrono::Duration::MAX)
    }

    pub fn refresh_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.refresh).unwrap_or(chrono::Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: SessionLifetimes = SessionLifetimes {
        session: Duration::from_secs(3600),
        refresh: Duration::from_secs(7 * 24 * 3600),
    };

    #[test]
    fn test_overrides() {
        let settings = SessionSettings {
            user_id: UserId::from_string("u-1"),
            session_ttl_secs: Some(600),
            refresh_ttl_secs: None,
        };
        let resolved = settings.resolve(DEFAULTS);
        assert_eq!(resolved.session, Duration::from_secs(600));
        assert_eq!(resolved.refresh, DEFAULTS.refresh);
    }

    #[test]
    fn test_non_positive_overrides_ignored() {
        let settings = SessionSettings {
            user_id: UserId::from_string("u-1"),
            session_ttl_secs: Some(0),
            refresh_ttl_secs: Some(-5),
        };
        assert_eq!(settings.resolve(DEFAULTS), DEFAULTS);
    }

    #[test]
    fn test_oversized_override_capped() {
        let settings = SessionSettings {
            user_id: UserId::from_string("u-1"),
            session_ttl_secs: Some(i64::MAX),
            refresh_ttl_secs: Some(i64::MAX),
        };
        let resolved = settings.resolve(DEFAULTS);
        assert_eq!(resolved.session.as_secs(), MAX_TTL_SECS as u64);
        assert_eq!(resolved.refresh.as_secs(), MAX_TTL_SECS as u64);
    }

    #[test]
    fn test_session_capped_at_refresh_window() {
        let settings = SessionSettings {
            user_id: UserId::from_string("u-1"),
            session_ttl_secs: Some(30 * 24 * 3600),
            refresh_ttl_secs: None,
        };
        assert_eq!(settings.resolve(DEFAULTS).session, DEFAULTS.refresh);

        let settings = SessionSettings {
            user_id: UserId::from_string("u-1"),
            session_ttl_secs: None,
            refresh_ttl_secs: Some(600),
        };
        let resolved = settings.resolve(DEFAULTS);
        assert_eq!(resolved.session, Duration::from_secs(600));
        assert_eq!(resolved.refresh, Duration::from_secs(600));
    }
}
