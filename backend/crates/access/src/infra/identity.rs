//! Document-backed Identity Provider
//!
//! Keeps credentials, live sessions and the reset-mail outbox in the same
//! document store as the profiles.

use chrono::{Duration, Utc};
use platform::client::ClientFingerprint;
use platform::crypto::{random_token, sha256_token};
use platform::password::{ClearTextPassword, HashedPassword};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::entity::{
    credential::Credential, idp_session::IdpSession, mail::OutboundMail,
    session_settings::SessionLifetimes,
};
use crate::domain::identity::{IdentityProvider, IssuedSession};
use crate::domain::token::{SessionClaims, TokenSigner};
use crate::domain::value_object::{Email, IdpSessionId, UserId};
use crate::error::{AccessError, AccessResult};
use crate::infra::document::{DocumentStore, collections, decode, decode_all, encode};

/// Bytes of entropy in refresh and reset tokens
const TOKEN_BYTES: usize = 32;

pub struct DocumentIdentityProvider<S> {
    store: Arc<S>,
    signer: TokenSigner,
    pepper: Option<Vec<u8>>,
    reset_ttl: Duration,
}

impl<S> DocumentIdentityProvider<S> {
    pub fn new(store: Arc<S>, signer: TokenSigner) -> Self {
        Self {
            store,
            signer,
            pepper: None,
            reset_ttl: Duration::minutes(30),
        }
    }

    pub fn with_pepper(mut self, pepper: Option<Vec<u8>>) -> Self {
        self.pepper = pepper;
        self
    }

    pub fn with_reset_ttl(mut self, ttl: std::time::Duration) -> Self {
        self.reset_ttl = Duration::from_std(ttl).unwrap_or(self.reset_ttl);
        self
    }

    fn pepper(&self) -> Option<&[u8]> {
        self.pepper.as_deref()
    }
}

impl<S> DocumentIdentityProvider<S>
where
    S: DocumentStore + Send + Sync,
{
    async fn find_credential(&self, field: &str, value: &str) -> AccessResult<Option<Credential>> {
        let found = self
            .store
            .find_by_field(collections::CREDENTIALS, field, &Value::from(value))
            .await?;
        found.into_iter().next().map(decode).transpose()
    }

    async fn save_credential(&self, credential: &Credential) -> AccessResult<()> {
        self.store
            .put(
                collections::CREDENTIALS,
                credential.user_id.as_str(),
                encode(credential)?,
            )
            .await
    }

    async fn sessions_where(&self, field: &str, value: &str) -> AccessResult<Vec<IdpSession>> {
        decode_all(
            self.store
                .find_by_field(collections::IDP_SESSIONS, field, &Value::from(value))
                .await?,
        )
    }

    async fn save_session(&self, session: &IdpSession) -> AccessResult<()> {
        self.store
            .put(collections::IDP_SESSIONS, session.id.as_str(), encode(session)?)
            .await
    }

    fn issue_bearer(&self, session: &IdpSession) -> AccessResult<String> {
        let claims = SessionClaims::new(
            &session.user_id,
            &session.email,
            &session.id,
            Utc::now(),
            session.bearer_ttl(),
        );
        self.signer.issue(&claims)
    }

    fn issued(&self, session: &IdpSession, refresh_token: String) -> AccessResult<IssuedSession> {
        Ok(IssuedSession {
            session_id: session.id.clone(),
            bearer_token: self.issue_bearer(session)?,
            refresh_token,
            bearer_expires_in: session.bearer_ttl().to_std().unwrap_or_default(),
            refresh_expires_in: std::time::Duration::from_millis(
                session.remaining_ms().unsigned_abs(),
            ),
        })
    }
}

impl<S> IdentityProvider for DocumentIdentityProvider<S>
where
    S: DocumentStore + Send + Sync,
{
    async fn create_account(
        &self,
        user_id: &UserId,
        email: &Email,
        password: &ClearTextPassword,
    ) -> AccessResult<()> {
        if self.find_credential("email", email.as_str()).await?.is_some() {
            return Err(AccessError::EmailTaken);
        }

        let hash = password.hash(self.pepper())?;
        let credential = Credential::new(
            user_id.clone(),
            email.clone(),
            hash.as_phc_string().to_string(),
        );
        self.save_credential(&credential).await?;

        tracing::info!(user_id = %user_id, "Identity account created");
        Ok(())
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &ClearTextPassword,
    ) -> AccessResult<UserId> {
        let credential = self
            .find_credential("email", email.as_str())
            .await?
            .ok_or(AccessError::InvalidCredentials)?;

        let hash = HashedPassword::from_phc_string(credential.password_hash.as_str())?;
        if !hash.verify(password, self.pepper()) {
            return Err(AccessError::InvalidCredentials);
        }

        Ok(credential.user_id)
    }

    async fn open_session(
        &self,
        user_id: &UserId,
        email: &Email,
        fingerprint: &ClientFingerprint,
        lifetimes: SessionLifetimes,
    ) -> AccessResult<IssuedSession> {
        let fingerprint_key = fingerprint.key();

        // One session per user and browser context. The fingerprint alone is
        // shared by everyone on the same browser build.
        let previous_sessions = self
            .sessions_where("fingerprint", &fingerprint_key)
            .await?
            .into_iter()
            .filter(|previous| previous.user_id == *user_id);
        for previous in previous_sessions {
            self.store
                .delete(collections::IDP_SESSIONS, previous.id.as_str())
                .await?;
        }

        let refresh_token = random_token(TOKEN_BYTES);
        let session = IdpSession::new(
            user_id.clone(),
            email.clone(),
            fingerprint_key,
            sha256_token(&refresh_token),
            lifetimes.session_chrono(),
            lifetimes.refresh_chrono(),
        );
        self.save_session(&session).await?;

        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            ip = ?fingerprint.ip_string(),
            "Identity session opened"
        );

        self.issued(&session, refresh_token)
    }

    async fn has_live_session(&self, fingerprint: &ClientFingerprint) -> AccessResult<bool> {
        let sessions = self.sessions_where("fingerprint", &fingerprint.key()).await?;
        Ok(sessions.iter().any(|session| !session.is_expired()))
    }

    async fn refresh_session(
        &self,
        refresh_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> AccessResult<IssuedSession> {
        let mut session = self
            .sessions_where("refreshTokenHash", &sha256_token(refresh_token))
            .await?
            .into_iter()
            .next()
            .ok_or(AccessError::InvalidToken)?;

        if session.is_expired() {
            self.store
                .delete(collections::IDP_SESSIONS, session.id.as_str())
                .await?;
            return Err(AccessError::TokenExpired);
        }

        if session.fingerprint != fingerprint.key() {
            tracing::warn!(session_id = %session.id, "Refresh attempted from another browser context");
            return Err(AccessError::InvalidToken);
        }

        let rotated = random_token(TOKEN_BYTES);
        session.rotate_refresh_token(sha256_token(&rotated));
        self.save_session(&session).await?;

        tracing::debug!(session_id = %session.id, "Identity session refreshed");
        self.issued(&session, rotated)
    }

    async fn revoke_session(&self, session_id: &IdpSessionId) -> AccessResult<()> {
        let deleted = self
            .store
            .delete(collections::IDP_SESSIONS, session_id.as_str())
            .await?;
        tracing::info!(session_id = %session_id, deleted, "Identity session revoked");
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: &UserId) -> AccessResult<u64> {
        let mut revoked = 0;
        for session in self.sessions_where("userId", user_id.as_str()).await? {
            if self
                .store
                .delete(collections::IDP_SESSIONS, session.id.as_str())
                .await?
            {
                revoked += 1;
            }
        }

        tracing::info!(user_id = %user_id, revoked, "Identity sessions revoked");
        Ok(revoked)
    }

    async fn send_password_reset(&self, email: &Email) -> AccessResult<()> {
        let Some(mut credential) = self.find_credential("email", email.as_str()).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = random_token(TOKEN_BYTES);
        credential.start_reset(sha256_token(&token), self.reset_ttl);
        self.save_credential(&credential).await?;

        let mail = OutboundMail::password_reset(email.clone(), token);
        self.store
            .put(collections::MAIL_OUTBOX, mail.id.as_str(), encode(&mail)?)
            .await?;

        tracing::info!(user_id = %credential.user_id, mail_id = %mail.id, "Password reset queued");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        password: &ClearTextPassword,
    ) -> AccessResult<UserId> {
        let token_hash = sha256_token(reset_token);
        let mut credential = self
            .find_credential("resetTokenHash", &token_hash)
            .await?
            .filter(|credential| credential.reset_is_valid(&token_hash))
            .ok_or(AccessError::InvalidResetToken)?;

        let hash = password.hash(self.pepper())?;
        credential.complete_reset(hash.as_phc_string().to_string());
        self.save_credential(&credential).await?;

        self.revoke_all_for_user(&credential.user_id).await?;

        tracing::info!(user_id = %credential.user_id, "Password reset completed");
        Ok(credential.user_id)
    }

    async fn cleanup_expired(&self) -> AccessResult<u64> {
        let sessions: Vec<IdpSession> =
            decode_all(self.store.list(collections::IDP_SESSIONS).await?)?;

        let mut deleted = 0;
        for session in sessions.iter().filter(|session| session.is_expired()) {
            if self
                .store
                .delete(collections::IDP_SESSIONS, session.id.as_str())
                .await?
            {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}
