//! Ability Factory
//!
//! `define_ability(user_id)`: user → role id → role → active check →
//! compiled [`Ability`]. Two reads, no writes.

use std::sync::Arc;

use crate::domain::entity::{ability::Ability, role::Role};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::{AccessError, AccessResult};

pub struct AbilityFactory<R> {
    repo: Arc<R>,
}

impl<R> Clone for AbilityFactory<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R> AbilityFactory<R>
where
    R: UserRepository + RoleRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Resolve the single active role of a user
    ///
    /// ## Errors
    /// * `UserNotFound` / `RoleNotAssigned` / `RoleNotFound` / `RoleInactive`
    pub async fn active_role(&self, user_id: &UserId) -> AccessResult<Role> {
        let user = self
            .repo
            .find_user(user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;

        let role_id = user.role_id.ok_or(AccessError::RoleNotAssigned)?;

        let role = self
            .repo
            .find_role(&role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)?;

        if !role.is_active {
            tracing::debug!(user_id = %user_id, role = %role.name, "Role is inactive");
            return Err(AccessError::RoleInactive);
        }

        Ok(role)
    }

    pub async fn define_ability(&self, user_id: &UserId) -> AccessResult<Ability> {
        let role = self.active_role(user_id).await?;
        let ability = Ability::compile(&role)?;

        tracing::debug!(
            user_id = %user_id,
            role = %role.name,
            rules = ability.rules().len(),
            "Ability defined"
        );
        Ok(ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{policy::Policy, user::User};
    use crate::domain::value_object::{Action, Email, Subject};
    use crate::infra::{document::DocumentRepository, memory::MemoryDocumentStore};

    type Repo = DocumentRepository<MemoryDocumentStore>;

    async fn user_with_role(repo: &Repo, role: Option<&Role>) -> UserId {
        let user = User::new(
            UserId::new(),
            Email::new("caller@example.com").unwrap(),
            role.map(|role| role.id.clone()),
        );
        repo.save_user(&user).await.unwrap();
        user.id
    }

    fn factory() -> (Repo, AbilityFactory<Repo>) {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        (repo.clone(), AbilityFactory::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn test_subscriber_ability() {
        let (repo, factory) = factory();
        let role = Role::new("subscriber", "", vec![Policy::can(Action::Read, Subject::User)]);
        repo.save_role(&role).await.unwrap();
        let user_id = user_with_role(&repo, Some(&role)).await;

        let ability = factory.define_ability(&user_id).await.unwrap();
        assert!(ability.can(Action::Read, Subject::User));
        assert!(ability.cannot(Action::Update, Subject::User));
    }

    #[tokio::test]
    async fn test_unresolvable_roles_fail() {
        let (repo, factory) = factory();

        assert!(matches!(
            factory.define_ability(&UserId::new()).await,
            Err(AccessError::UserNotFound)
        ));

        let unassigned = user_with_role(&repo, None).await;
        assert!(matches!(
            factory.define_ability(&unassigned).await,
            Err(AccessError::RoleNotAssigned)
        ));

        let dangling = Role::new("ghost", "", vec![]);
        let orphan = user_with_role(&repo, Some(&dangling)).await;
        assert!(matches!(
            factory.define_ability(&orphan).await,
            Err(AccessError::RoleNotFound)
        ));

        let inactive = Role::new("retired", "", vec![Policy::can(Action::Manage, Subject::All)])
            .deactivated();
        repo.save_role(&inactive).await.unwrap();
        let retired = user_with_role(&repo, Some(&inactive)).await;
        assert!(matches!(
            factory.define_ability(&retired).await,
            Err(AccessError::RoleInactive)
        ));
    }

    #[tokio::test]
    async fn test_invalid_allowance_is_configuration_error() {
        let (repo, factory) = factory();
        let mut policy = Policy::can(Action::Read, Subject::User);
        policy.allowance = "SOMETIMES".to_string();
        let role = Role::new("broken", "", vec![policy]);
        repo.save_role(&role).await.unwrap();
        let user_id = user_with_role(&repo, Some(&role)).await;

        assert!(matches!(
            factory.define_ability(&user_id).await,
            Err(AccessError::InvalidPolicyInRole { .. })
        ));
    }
}
