//! Check Session Use Case
//!
//! Describes the caller's session for the client.

use serde::Serialize;

use crate::application::define_ability::AbilityFactory;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::token::SessionClaims;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Name of the active role, when it resolves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
}

impl SessionStatus {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user_id: None,
            email: None,
            role: None,
            expires_at_ms: None,
        }
    }
}

pub struct CheckSessionUseCase<R> {
    factory: AbilityFactory<R>,
}

impl<R> CheckSessionUseCase<R>
where
    R: UserRepository + RoleRepository + Send + Sync,
{
    pub fn new(factory: AbilityFactory<R>) -> Self {
        Self { factory }
    }

    pub async fn execute(&self, caller: Option<&SessionClaims>) -> SessionStatus {
        let Some(caller) = caller else {
            return SessionStatus::anonymous();
        };

        let role = match self.factory.active_role(&caller.user_id()).await {
            Ok(role) => Some(role.name),
            Err(err) => {
                tracing::debug!(user_id = %caller.id, error = %err, "Session without an active role");
                None
            }
        };

        SessionStatus {
            authenticated: true,
            user_id: Some(caller.id.clone()),
            email: Some(caller.email.clone()),
            role,
            expires_at_ms: Some(caller.expires_at_ms()),
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

    #[tokio::test]
    async fn test_status() {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        let role = Role::new("subscriber", "", vec![]);
        repo.save_role(&role).await.unwrap();
        let user = User::new(UserId::new(), Email::new("s@example.com").unwrap(), Some(role.id));
        repo.save_user(&user).await.unwrap();

        let use_case = CheckSessionUseCase::new(AbilityFactory::new(Arc::new(repo)));
        assert!(!use_case.execute(None).await.authenticated);

        let claims = SessionClaims::new(
            &user.id,
            &user.email,
            &IdpSessionId::new(),
            chrono::Utc::now(),
            chrono::Duration::minutes(5),
        );
        let status = use_case.execute(Some(&claims)).await;
        assert!(status.authenticated);
        assert_eq!(status.role.as_deref(), Some("subscriber"));
        assert_eq!(status.email.as_deref(), Some("s@example.com"));
    }
}
