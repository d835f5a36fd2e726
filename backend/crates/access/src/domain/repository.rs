//! Repository Traits
//!
//! Interfaces for profile, role and session-setting persistence.
//! Implementation is in the infrastructure layer.

use crate::domain::entity::{role::Role, session_settings::SessionSettings, user::User};
use crate::domain::value_object::{Email, RoleId, UserId};
use crate::error::AccessResult;

/// User profile repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_user(&self, user_id: &UserId) -> AccessResult<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> AccessResult<Option<User>>;

    async fn list_users(&self) -> AccessResult<Vec<User>>;

    /// Insert or replace
    async fn save_user(&self, user: &User) -> AccessResult<()>;
}

/// Role repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    async fn find_role(&self, role_id: &RoleId) -> AccessResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> AccessResult<Option<Role>>;

    /// The role flagged `isDefault`, if any
    async fn find_default_role(&self) -> AccessResult<Option<Role>>;

    async fn list_roles(&self) -> AccessResult<Vec<Role>>;

    /// Insert or replace
    async fn save_role(&self, role: &Role) -> AccessResult<()>;

    /// Returns whether a role was deleted
    async fn delete_role(&self, role_id: &RoleId) -> AccessResult<bool>;
}

/// Per-user session lifetime overrides
#[trait_variant::make(SessionSettingsRepository: Send)]
pub trait LocalSessionSettingsRepository {
    async fn find_session_settings(&self, user_id: &UserId) -> AccessResult<Option<SessionSettings>>;

    async fn save_session_settings(&self, settings: &SessionSettings) -> AccessResult<()>;
}

/// Everything the HTTP layer needs from storage
pub trait AccessRepository:
    UserRepository + RoleRepository + SessionSettingsRepository + Send + Sync + 'static
{
}

impl<T> AccessRepository for T where
    T: UserRepository + RoleRepository + SessionSettingsRepository + Send + Sync + 'static
{
}
