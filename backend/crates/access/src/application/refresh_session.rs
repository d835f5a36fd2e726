//! Refresh Session Use Case

use std::sync::Arc;

use platform::client::ClientFingerprint;

use crate::domain::identity::{IdentityProvider, IssuedSession};
use crate::error::{AccessError, AccessResult};

pub struct RefreshSessionUseCase<I> {
    identity: Arc<I>,
}

impl<I> RefreshSessionUseCase<I>
where
    I: IdentityProvider + Send + Sync,
{
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    /// ## Errors
    /// * `NotAuthenticated` - no refresh token was presented
    /// * `InvalidToken` / `TokenExpired` - from the identity provider
    pub async fn execute(
        &self,
        refresh_token: Option<&str>,
        fingerprint: &ClientFingerprint,
    ) -> AccessResult<IssuedSession> {
        let refresh_token = refresh_token.ok_or(AccessError::NotAuthenticated)?;
        let session = self
            .identity
            .refresh_session(refresh_token, fingerprint)
            .await?;

        tracing::debug!(session_id = %session.session_id, "Session refreshed");
        Ok(session)
    }
}
