//! Identity Provider Port
//!
//! Accounts, credentials and live sessions are owned by the identity
//! provider. The access layer only talks to it through this trait.

use platform::client::ClientFingerprint;
use platform::password::ClearTextPassword;
use std::time::Duration;

use crate::domain::entity::session_settings::SessionLifetimes;
use crate::domain::value_object::{Email, IdpSessionId, UserId};
use crate::error::AccessResult;

/// Tokens handed out when a session is opened or refreshed
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: IdpSessionId,
    /// Signed bearer token (goes into the session cookie)
    pub bearer_token: String,
    /// Opaque refresh token (goes into the refresh cookie)
    pub refresh_token: String,
    pub bearer_expires_in: Duration,
    pub refresh_expires_in: Duration,
}

#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// ## Errors
    /// * `EmailTaken` - an account with this email already exists
    async fn create_account(
        &self,
        user_id: &UserId,
        email: &Email,
        password: &ClearTextPassword,
    ) -> AccessResult<()>;

    /// ## Errors
    /// * `InvalidCredentials` - unknown email or wrong password
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &ClearTextPassword,
    ) -> AccessResult<UserId>;

    /// Open a session, replacing the user's sessions in the same browser context
    async fn open_session(
        &self,
        user_id: &UserId,
        email: &Email,
        fingerprint: &ClientFingerprint,
        lifetimes: SessionLifetimes,
    ) -> AccessResult<IssuedSession>;

    /// Whether an unexpired session exists for this browser context
    async fn has_live_session(&self, fingerprint: &ClientFingerprint) -> AccessResult<bool>;

    /// Issue a new bearer token and rotate the refresh token
    ///
    /// ## Errors
    /// * `InvalidToken` - unknown refresh token or different browser context
    /// * `TokenExpired` - refresh window has ended
    async fn refresh_session(
        &self,
        refresh_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> AccessResult<IssuedSession>;

    async fn revoke_session(&self, session_id: &IdpSessionId) -> AccessResult<()>;

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AccessResult<u64>;

    /// Queue a reset mail; unknown addresses succeed silently
    async fn send_password_reset(&self, email: &Email) -> AccessResult<()>;

    /// ## Errors
    /// * `InvalidResetToken` - unknown, used or expired token
    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        password: &ClearTextPassword,
    ) -> AccessResult<UserId>;

    /// Delete expired sessions, returning how many were removed
    async fn cleanup_expired(&self) -> AccessResult<u64>;
}
