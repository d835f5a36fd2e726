//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling:
//! - NFKC normalization, 8..=128 code points, no control characters
//! - Rejection of trivially guessable passwords
//! - Argon2id hashing (PHC string format) with optional pepper
//! - Zeroization of clear text on drop

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, erased from memory when dropped
///
/// Not `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate a new password (sign-up, reset) against the policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count code points, not bytes
        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(Self(normalized))
    }

    /// Wrap a submitted password for verification only
    ///
    /// Normalized the same way as [`ClearTextPassword::new`] but not checked
    /// against the policy: stored hashes may predate policy changes.
    pub fn for_verification(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(pepper) = pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    /// Hash with Argon2id (OWASP defaults: m=19456, t=2, p=1)
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let mut bytes = self.peppered(pepper);
        let salt = SaltString::generate(OsRng);

        let result = Argon2::default()
            .hash_password(&bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        bytes.zeroize();
        result
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password (constant time inside argon2)
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        let mut bytes = password.peppered(pepper);
        let valid = Argon2::default().verify_password(&bytes, &parsed).is_ok();
        bytes.zeroize();
        valid
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "abcdefgh",
    "letmein1",
    "welcome1",
    "admin123",
    "iloveyou",
    "sunshine",
    "football",
    "baseball",
    "trustno1",
];

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    is_sequential_digits(&lower)
        || KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p))
        || COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Digit-only runs such as `12345678` or `98765432` (wrapping through 0)
fn is_sequential_digits(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 4 {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}
