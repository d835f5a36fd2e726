//! Freeze Guard
//!
//! Blocks a second login from a browser context that already holds a
//! session. Two observations decide:
//!
//! | signed cookie | live IdP session | decision |
//! |---|---|---|
//! | no  | no  | admit |
//! | yes | yes | deny  |
//! | yes | no  | deny  |
//! | no  | yes | admit |

use std::sync::Arc;

use platform::client::ClientFingerprint;

use crate::application::decision::{DenyReason, GuardDecision};
use crate::domain::identity::IdentityProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    NoSessionNoAuth,
    SessionAndAuth,
    /// Cookie left over from a session the identity provider no longer knows
    SessionNoAuth,
    /// Identity provider session without a cookie in this browser
    NoSessionButAuth,
}

impl FreezeState {
    pub fn observe(has_signed_cookie: bool, has_live_session: bool) -> Self {
        match (has_signed_cookie, has_live_session) {
            (false, false) => FreezeState::NoSessionNoAuth,
            (true, true) => FreezeState::SessionAndAuth,
            (true, false) => FreezeState::SessionNoAuth,
            (false, true) => FreezeState::NoSessionButAuth,
        }
    }

    pub fn decision(self) -> GuardDecision {
        match self {
            FreezeState::NoSessionNoAuth | FreezeState::NoSessionButAuth => GuardDecision::Allowed,
            FreezeState::SessionAndAuth | FreezeState::SessionNoAuth => {
                GuardDecision::Denied(DenyReason::SessionInCourse)
            }
        }
    }
}

pub struct FreezeGuard<I> {
    identity: Arc<I>,
}

impl<I> FreezeGuard<I>
where
    I: IdentityProvider + Send + Sync,
{
    pub fn new(identity: Arc<I>) -> Self {
        Self { identity }
    }

    pub async fn check(
        &self,
        has_signed_cookie: bool,
        fingerprint: Option<&ClientFingerprint>,
    ) -> GuardDecision {
        let Some(fingerprint) = fingerprint else {
            tracing::warn!("Login attempted without a User-Agent");
            return GuardDecision::Denied(DenyReason::UnidentifiedClient);
        };

        let has_live_session = match self.identity.has_live_session(fingerprint).await {
            Ok(live) => live,
            Err(err) => {
                tracing::error!(error = %err, "Session lookup failed, denying login");
                return GuardDecision::Denied(DenyReason::Unavailable);
            }
        };

        let state = FreezeState::observe(has_signed_cookie, has_live_session);
        tracing::debug!(?state, ip = ?fingerprint.ip_string(), "Freeze state observed");
        state.decision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::session_settings::SessionLifetimes;
    use crate::domain::token::TokenSigner;
    use crate::domain::value_object::{Email, UserId};
    use crate::infra::{identity::DocumentIdentityProvider, memory::MemoryDocumentStore};
    use std::time::Duration;

    type Provider = DocumentIdentityProvider<MemoryDocumentStore>;

    fn guard() -> (Arc<Provider>, FreezeGuard<Provider>) {
        let provider = Arc::new(DocumentIdentityProvider::new(
            Arc::new(MemoryDocumentStore::new()),
            TokenSigner::new([3u8; 32]),
        ));
        (provider.clone(), FreezeGuard::new(provider))
    }

    #[test]
    fn test_truth_table() {
        let denied = GuardDecision::Denied(DenyReason::SessionInCourse);
        assert_eq!(FreezeState::observe(false, false).decision(), GuardDecision::Allowed);
        assert_eq!(FreezeState::observe(true, true).decision(), denied);
        assert_eq!(FreezeState::observe(true, false).decision(), denied);
        assert_eq!(FreezeState::observe(false, true).decision(), GuardDecision::Allowed);
    }

    #[tokio::test]
    async fn test_live_session_with_cookie_is_frozen() {
        let (provider, guard) = guard();
        let fingerprint = ClientFingerprint::from_user_agent("Mozilla/5.0 Freeze", None);

        assert!(guard.check(false, Some(&fingerprint)).await.is_allowed());

        provider
            .open_session(
                &UserId::new(),
                &Email::new("frozen@example.com").unwrap(),
                &fingerprint,
                SessionLifetimes {
                    session: Duration::from_secs(60),
                    refresh: Duration::from_secs(600),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            guard.check(true, Some(&fingerprint)).await,
            GuardDecision::Denied(DenyReason::SessionInCourse)
        );
        assert!(guard.check(false, Some(&fingerprint)).await.is_allowed());

        let other_browser = ClientFingerprint::from_user_agent("curl/8.0", None);
        assert_eq!(
            guard.check(true, Some(&other_browser)).await,
            GuardDecision::Denied(DenyReason::SessionInCourse)
        );
    }

    #[tokio::test]
    async fn test_missing_user_agent_denies() {
        let (_, guard) = guard();
        assert_eq!(
            guard.check(false, None).await,
            GuardDecision::Denied(DenyReason::UnidentifiedClient)
        );
    }
}
