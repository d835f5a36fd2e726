//! Default Roles
//!
//! Seeds `subscriber` (default) and `admin` into an empty role collection.

use crate::domain::entity::{policy::Policy, role::Role};
use crate::domain::repository::RoleRepository;
use crate::domain::value_object::{Action, Subject};
use crate::error::AccessResult;

pub const SUBSCRIBER_ROLE: &str = "subscriber";
pub const ADMIN_ROLE: &str = "admin";

pub fn default_roles() -> Vec<Role> {
    vec![
        Role::new(
            SUBSCRIBER_ROLE,
            "Signed-up user",
            vec![Policy::can(Action::Read, Subject::User)],
        )
        .as_default(),
        Role::new(
            ADMIN_ROLE,
            "Full access",
            vec![Policy::can(Action::Manage, Subject::All)],
        ),
    ]
}

/// Returns whether anything was written
pub async fn seed_default_roles<R>(repo: &R) -> AccessResult<bool>
where
    R: RoleRepository + Send + Sync,
{
    if !repo.list_roles().await?.is_empty() {
        tracing::debug!("Roles present, skipping seed");
        return Ok(false);
    }

    for role in default_roles() {
        repo.save_role(&role).await?;
        tracing::info!(role = %role.name, "Seeded role");
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{document::DocumentRepository, memory::MemoryDocumentStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_only_once() {
        let repo = DocumentRepository::new(Arc::new(MemoryDocumentStore::new()));
        assert!(seed_default_roles(&repo).await.unwrap());
        assert!(!seed_default_roles(&repo).await.unwrap());

        let default = repo.find_default_role().await.unwrap().unwrap();
        assert_eq!(default.name, SUBSCRIBER_ROLE);
        assert!(repo.find_role_by_name(ADMIN_ROLE).await.unwrap().is_some());
    }
}
