//! Sign Up Use Case
//!
//! Creates the identity-provider account and the profile, assigned to the
//! default role.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::entity::user::User;
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{Email, UserId};
use crate::error::{AccessError, AccessResult};

pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

pub struct SignUpOutput {
    pub user: User,
}

pub struct SignUpUseCase<R, I> {
    repo: Arc<R>,
    identity: Arc<I>,
}

impl<R, I> SignUpUseCase<R, I>
where
    R: UserRepository + RoleRepository + Send + Sync,
    I: IdentityProvider + Send + Sync,
{
    pub fn new(repo: Arc<R>, identity: Arc<I>) -> Self {
        Self { repo, identity }
    }

    pub async fn execute(&self, input: SignUpInput) -> AccessResult<SignUpOutput> {
        let email = Email::new(&input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AccessError::EmailTaken);
        }

        let role = self
            .repo
            .find_default_role()
            .await?
            .filter(|role| role.is_active)
            .ok_or(AccessError::NoDefaultRole)?;

        let user_id = UserId::new();
        self.identity
            .create_account(&user_id, &email, &password)
            .await?;

        let mut user = User::new(user_id, email, Some(role.id.clone()));
        user.rename(input.display_name);
        self.repo.save_user(&user).await?;

        tracing::info!(user_id = %user.id, role = %role.name, "User signed up");

        Ok(SignUpOutput { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::role::Role;
    use crate::domain::token::TokenSigner;
    use crate::infra::{
        document::DocumentRepository, identity::DocumentIdentityProvider,
        memory::MemoryDocumentStore,
    };

    type Repo = DocumentRepository<MemoryDocumentStore>;
    type Provider = DocumentIdentityProvider<MemoryDocumentStore>;

    fn use_case() -> (Repo, SignUpUseCase<Repo, Provider>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = DocumentRepository::new(store.clone());
        let identity = DocumentIdentityProvider::new(store, TokenSigner::new([4u8; 32]));
        (
            repo.clone(),
            SignUpUseCase::new(Arc::new(repo), Arc::new(identity)),
        )
    }

    fn input(email: &str) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: "Plenty-Long-Passphrase".to_string(),
            display_name: Some("  Reader ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sign_up_assigns_default_role() {
        let (repo, use_case) = use_case();
        let subscriber = Role::new("subscriber", "", vec![]).as_default();
        repo.save_role(&subscriber).await.unwrap();

        let output = use_case.execute(input("New@Example.com")).await.unwrap();
        assert_eq!(output.user.role_id, Some(subscriber.id));
        assert_eq!(output.user.email.as_str(), "new@example.com");
        assert_eq!(output.user.display_name.as_deref(), Some("Reader"));
        assert!(repo.find_user(&output.user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (repo, use_case) = use_case();
        repo.save_role(&Role::new("subscriber", "", vec![]).as_default())
            .await
            .unwrap();

        use_case.execute(input("dup@example.com")).await.unwrap();
        assert!(matches!(
            use_case.execute(input("dup@example.com")).await,
            Err(AccessError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_no_default_role() {
        let (repo, use_case) = use_case();
        assert!(matches!(
            use_case.execute(input("a@example.com")).await,
            Err(AccessError::NoDefaultRole)
        ));

        repo.save_role(&Role::new("subscriber", "", vec![]).as_default().deactivated())
            .await
            .unwrap();
        assert!(matches!(
            use_case.execute(input("a@example.com")).await,
            Err(AccessError::NoDefaultRole)
        ));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let (_, use_case) = use_case();
        let mut weak = input("weak@example.com");
        weak.password = "short".to_string();
        assert!(matches!(
            use_case.execute(weak).await,
            Err(AccessError::PasswordPolicy(_))
        ));
    }
}
