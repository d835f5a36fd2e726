//! Sign In Use Case
//!
//! Verifies credentials with the identity provider and opens a session
//! with the caller's configured lifetimes.

use std::sync::Arc;

use platform::client::ClientFingerprint;
use platform::password::ClearTextPassword;

use crate::application::session_lifetimes::SessionLifetimeService;
use crate::domain::entity::user::User;
use crate::domain::identity::{IdentityProvider, IssuedSession};
use crate::domain::repository::{SessionSettingsRepository, UserRepository};
use crate::domain::value_object::Email;
use crate::error::{AccessError, AccessResult};

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

pub struct SignInOutput {
    pub user: User,
    pub session: IssuedSession,
}

pub struct SignInUseCase<R, I> {
    repo: Arc<R>,
    identity: Arc<I>,
    lifetimes: SessionLifetimeService<R>,
}

impl<R, I> SignInUseCase<R, I>
where
    R: UserRepository + SessionSettingsRepository + Send + Sync,
    I: IdentityProvider + Send + Sync,
{
    pub fn new(repo: Arc<R>, identity: Arc<I>, lifetimes: SessionLifetimeService<R>) -> Self {
        Self {
            repo,
            identity,
            lifetimes,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: &ClientFingerprint,
    ) -> AccessResult<SignInOutput> {
        let email = Email::new(&input.email).map_err(|_| AccessError::InvalidCredentials)?;
        let password = ClearTextPassword::for_verification(input.password);

        let user_id = self.identity.verify_credentials(&email, &password).await?;

        // Account without a profile cannot act on anything
        let user = self
            .repo
            .find_user(&user_id)
            .await?
            .ok_or(AccessError::InvalidCredentials)?;

        let lifetimes = self.lifetimes.lifetimes_for(&user.id).await?;
        let session = self
            .identity
            .open_session(&user.id, &user.email, fingerprint, lifetimes)
            .await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %session.session_id,
            session_ttl_secs = lifetimes.session.as_secs(),
            "User signed in"
        );

        Ok(SignInOutput { user, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::session_settings::SessionLifetimes;
    use crate::domain::token::TokenSigner;
    use crate::domain::value_object::UserId;
    use crate::infra::{
        document::DocumentRepository, identity::DocumentIdentityProvider,
        memory::MemoryDocumentStore,
    };
    use std::time::Duration;

    type Repo = DocumentRepository<MemoryDocumentStore>;
    type Provider = DocumentIdentityProvider<MemoryDocumentStore>;

    const PASSWORD: &str = "Plenty-Long-Passphrase";
    const DEFAULTS: SessionLifetimes = SessionLifetimes {
        session: Duration::from_secs(3600),
        refresh: Duration::from_secs(604_800),
    };

    async fn setup() -> (Repo, Arc<Provider>, SignInUseCase<Repo, Provider>, User) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = DocumentRepository::new(store.clone());
        let identity = Arc::new(DocumentIdentityProvider::new(store, TokenSigner::new([6u8; 32])));

        let user = User::new(UserId::new(), Email::new("in@example.com").unwrap(), None);
        identity
            .create_account(
                &user.id,
                &user.email,
                &ClearTextPassword::new(PASSWORD.to_string()).unwrap(),
            )
            .await
            .unwrap();
        repo.save_user(&user).await.unwrap();

        let shared = Arc::new(repo.clone());
        let use_case = SignInUseCase::new(
            shared.clone(),
            identity.clone(),
            SessionLifetimeService::new(shared, DEFAULTS),
        );
        (repo, identity, use_case, user)
    }

    fn fingerprint() -> ClientFingerprint {
        ClientFingerprint::from_user_agent("Mozilla/5.0 SignIn", None)
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_opens_session() {
        let (_, identity, use_case, user) = setup().await;
        let output = use_case
            .execute(input("IN@example.com", PASSWORD), &fingerprint())
            .await
            .unwrap();

        assert_eq!(output.user.id, user.id);
        assert_eq!(output.session.bearer_expires_in, DEFAULTS.session);
        assert!(identity.has_live_session(&fingerprint()).await.unwrap());
    }

    #[tokio::test]
    async fn test_per_user_lifetime_applies() {
        let (repo, _, use_case, user) = setup().await;
        SessionLifetimeService::new(Arc::new(repo), DEFAULTS)
            .update(&user.id, Some(120), None)
            .await
            .unwrap();

        let output = use_case
            .execute(input("in@example.com", PASSWORD), &fingerprint())
            .await
            .unwrap();
        assert_eq!(output.session.bearer_expires_in, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let (_, _, use_case, _) = setup().await;
        for (email, password) in [
            ("in@example.com", "wrong-password-here"),
            ("nobody@example.com", PASSWORD),
            ("not-an-email", PASSWORD),
        ] {
            assert!(matches!(
                use_case.execute(input(email, password), &fingerprint()).await,
                Err(AccessError::InvalidCredentials)
            ));
        }
    }
}
