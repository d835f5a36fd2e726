//! Email Value Object
//!
//! Login identifier for the identity provider. Trimmed and lower-cased so the
//! same address always maps to the same account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AccessError, AccessResult};

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;
const LOCAL_PART_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> AccessResult<Self> {
        let email = email.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(AccessError::Validation("Email cannot be empty".to_string()));
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AccessError::Validation(format!(
                "Email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }
        if !Self::is_valid_format(&email) {
            return Err(AccessError::Validation("Invalid email format".to_string()));
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH || local.contains(char::is_whitespace) {
            return false;
        }

        !domain.is_empty()
            && domain.contains('.')
            && domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && !domain.starts_with(['.', '-'])
            && !domain.ends_with(['.', '-'])
    }

    /// Wrap a value read back from the store (already validated on write)
    pub fn from_stored(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = AccessError;

    fn from_str(s: &str) -> AccessResult<Self> {
        Email::new(s)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
