//! Role Administration
//!
//! Roles are validated by compiling them before they are stored, so a role
//! that would fail ability construction never reaches the store.

use std::sync::Arc;

use crate::domain::entity::{ability::Ability, policy::Policy, role::Role, user::User};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{RoleId, UserId};
use crate::error::{AccessError, AccessResult};

const ROLE_NAME_MAX_LENGTH: usize = 64;

pub struct RoleInput {
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub is_active: bool,
    pub policies: Vec<Policy>,
}

pub struct ManageRolesUseCase<R> {
    repo: Arc<R>,
}

impl<R> ManageRolesUseCase<R>
where
    R: UserRepository + RoleRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AccessResult<Vec<Role>> {
        self.repo.list_roles().await
    }

    pub async fn get(&self, role_id: &RoleId) -> AccessResult<Role> {
        self.repo
            .find_role(role_id)
            .await?
            .ok_or(AccessError::RoleNotFound)
    }

    /// ## Errors
    /// * `Validation` - blank or overlong name
    /// * `RoleNameTaken` - another role has the name
    /// * `InvalidPolicyInRole` - a policy allowance other than CAN / CANNOT
    /// * `Validation` - an inactive role marked default
    pub async fn create(&self, input: RoleInput) -> AccessResult<Role> {
        let mut role = Role::new(normalize_name(&input.name)?, input.description, input.policies);
        role.is_default = input.is_default;
        role.is_active = input.is_active;

        self.ensure_name_free(&role.name, None).await?;
        self.store(&role).await?;

        tracing::info!(role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// ## Errors
    /// * `RoleNotFound`
    /// * `Validation` - the default role would lose its flag, or any create error
    pub async fn update(&self, role_id: &RoleId, input: RoleInput) -> AccessResult<Role> {
        let mut role = self.get(role_id).await?;
        // Sign-up needs an active default role at all times
        if role.is_default && !input.is_default {
            return Err(AccessError::Validation(
                "Mark another role as default before demoting the default role".to_string(),
            ));
        }

        let name = normalize_name(&input.name)?;
        self.ensure_name_free(&name, Some(role_id)).await?;

        role.name = name;
        role.description = input.description;
        role.is_default = input.is_default;
        role.is_active = input.is_active;
        role.policies = input.policies;
        self.store(&role).await?;

        tracing::info!(role_id = %role.id, role = %role.name, "Role updated");
        Ok(role)
    }

    /// ## Errors
    /// * `RoleNotFound`
    /// * `Validation` - the role is the default role
    pub async fn delete(&self, role_id: &RoleId) -> AccessResult<()> {
        let role = self.get(role_id).await?;
        if role.is_default {
            return Err(AccessError::Validation(
                "The default role cannot be deleted".to_string(),
            ));
        }

        self.repo.delete_role(role_id).await?;
        tracing::info!(role_id = %role_id, role = %role.name, "Role deleted");
        Ok(())
    }

    pub async fn assign_role(&self, user_id: &UserId, role_id: &RoleId) -> AccessResult<User> {
        let mut user = self
            .repo
            .find_user(user_id)
            .await?
            .ok_or(AccessError::UserNotFound)?;
        let role = self.get(role_id).await?;

        user.assign_role(role.id);
        self.repo.save_user(&user).await?;

        tracing::info!(user_id = %user_id, role = %role.name, "Role assigned");
        Ok(user)
    }

    async fn ensure_name_free(&self, name: &str, current: Option<&RoleId>) -> AccessResult<()> {
        match self.repo.find_role_by_name(name).await? {
            Some(existing) if Some(&existing.id) != current => Err(AccessError::RoleNameTaken),
            _ => Ok(()),
        }
    }

    async fn store(&self, role: &Role) -> AccessResult<()> {
        Ability::compile(role)?;

        if role.is_default && !role.is_active {
            return Err(AccessError::Validation(
                "The default role must be active".to_string(),
            ));
        }

        // Only one default role
        if role.is_default {
            for mut other in self.repo.list_roles().await? {
                if other.is_default && other.id != role.id {
                    other.is_default = false;
                    self.repo.save_role(&other).await?;
                    tracing::debug!(role = %other.name, "Default flag cleared");
                }
            }
        }

        self.repo.save_role(role).await
    }
}

fn normalize_name(name: &str) -> AccessResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AccessError::Validation("Role name cannot be empty".to_string()));
    }
    if name.chars().count() > ROLE_NAME_MAX_LENGTH {
        return Err(AccessError::Validation(format!(
            "Role name must be at most {ROLE_NAME_MAX_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}
