//! Privacy Guard
//!
//! Self-service routes: the caller may act on the user id in the path only
//! if it is their own, unless their role is in the route's excepted roles.

use crate::application::decision::{DenyReason, GuardDecision};
use crate::application::define_ability::AbilityFactory;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::token::SessionClaims;

pub struct PrivacyGuard<R> {
    factory: AbilityFactory<R>,
}

impl<R> PrivacyGuard<R>
where
    R: UserRepository + RoleRepository + Send + Sync,
{
    pub fn new(factory: AbilityFactory<R>) -> Self {
        Self { factory }
    }

    pub async fn check(
        &self,
        required_id: Option<&str>,
        caller: Option<&SessionClaims>,
        excepted_roles: &[String],
    ) -> GuardDecision {
        let Some(caller) = caller else {
            return GuardDecision::Denied(DenyReason::Unauthenticated);
        };

        if required_id == Some(caller.id.as_str()) {
            return GuardDecision::Allowed;
        }

        if excepted_roles.is_empty() {
            tracing::warn!(user_id = %caller.id, "Access to another user's resource denied");
            return GuardDecision::Denied(DenyReason::NotOwner);
        }

        let role = match self.factory.active_role(&caller.user_id()).await {
            Ok(role) => role,
            Err(err) => return GuardDecision::from_error(err),
        };

        if excepted_roles.iter().any(|excepted| *excepted == role.name) {
            tracing::debug!(user_id = %caller.id, role = %role.name, "Excepted role admitted");
            GuardDecision::Allowed
        } else {
            tracing::warn!(
                user_id = %caller.id,
                role = %role.name,
                "Access to another user's resource denied"
            );
            GuardDecision::Denied(DenyReason::NotOwner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{role::Role, user::User};
    use crate::domain::value_object::{Email, IdpSessionId, UserId};
    use crate::infra::{document::DocumentRepository, memory::MemoryDocumentStore};
    use std::sync::Arc;

    type Repo = DocumentRepository<MemoryDocumentStore>;

    async fn caller_with_role(role_name: &str) -> (PrivacyGuard<Repo>, SessionClaims) {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        let role = Role::new(role_name, "", vec![]);
        repo.save_role(&role).await.unwrap();

        let email = Email::new("caller@example.com").unwrap();
        let user = User::new(UserId::new(), email.clone(), Some(role.id.clone()));
        repo.save_user(&user).await.unwrap();

        let claims = SessionClaims::new(
            &user.id,
            &email,
            &IdpSessionId::new(),
            chrono::Utc::now(),
            chrono::Duration::hours(1),
        );
        (PrivacyGuard::new(AbilityFactory::new(Arc::new(repo))), claims)
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn test_owner_is_admitted_for_any_role() {
        for role in ["subscriber", "admin", "anything"] {
            let (guard, claims) = caller_with_role(role).await;
            let own_id = claims.id.clone();
            assert!(guard.check(Some(&own_id), Some(&claims), &[]).await.is_allowed());
            assert!(
                guard
                    .check(Some(&own_id), Some(&claims), &roles(&["admin"]))
                    .await
                    .is_allowed()
            );
        }
    }

    #[tokio::test]
    async fn test_mismatch_without_exceptions_denies() {
        let (guard, claims) = caller_with_role("admin").await;
        assert_eq!(
            guard.check(Some("someone-else"), Some(&claims), &[]).await,
            GuardDecision::Denied(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_mismatch_with_exceptions_admits_listed_roles_only() {
        let (admin, admin_claims) = caller_with_role("admin").await;
        assert!(
            admin
                .check(Some("someone-else"), Some(&admin_claims), &roles(&["admin", "support"]))
                .await
                .is_allowed()
        );

        let (subscriber, subscriber_claims) = caller_with_role("subscriber").await;
        assert_eq!(
            subscriber
                .check(Some("someone-else"), Some(&subscriber_claims), &roles(&["admin"]))
                .await,
            GuardDecision::Denied(DenyReason::NotOwner)
        );
    }

    #[tokio::test]
    async fn test_missing_caller_or_id() {
        let (guard, claims) = caller_with_role("subscriber").await;
        assert_eq!(
            guard.check(Some("x"), None, &[]).await,
            GuardDecision::Denied(DenyReason::Unauthenticated)
        );
        assert_eq!(
            guard.check(None, Some(&claims), &[]).await,
            GuardDecision::Denied(DenyReason::NotOwner)
        );
    }
}
