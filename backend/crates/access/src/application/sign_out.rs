//! Sign Out Use Case
//!
//! Revokes the identity-provider session named in the caller's token.
//! Never fails: the cookies are cleared regardless.

use std::sync::Arc;

use crate::domain::identity::IdentityProvider;
use crate::domain::token::SessionClaims;

pub struct SignOutUseCase<I> {
    identity: Arc<I>,
}

impl<I> SignOutUseCase<I>
where
    I: IdentityProvider + Send + Sync,
{
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    pub async fn execute(&self, caller: Option<&SessionClaims>) {
        let Some(caller) = caller else {
            tracing::debug!("Sign out without a session");
            return;
        };

        match self.identity.revoke_session(&caller.session_id()).await {
            Ok(()) => tracing::info!(user_id = %caller.id, session_id = %caller.sid, "User signed out"),
            Err(err) => tracing::error!(
                error = %err,
                session_id = %caller.sid,
                "Failed to revoke session on sign out"
            ),
        }
    }

    /// Revoke every session of the caller, returning how many were removed
    pub async fn execute_all(&self, caller: &SessionClaims) -> crate::error::AccessResult<u64> {
        let revoked = self.identity.revoke_all_for_user(&caller.user_id()).await?;
        tracing::info!(user_id = %caller.id, revoked, "User signed out everywhere");
        Ok(revoked)
    }
}
