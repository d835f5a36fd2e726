//! Domain Layer
//!
//! Contains entities, value objects, the session token format and the
//! repository / identity-provider ports.

pub mod entity;
pub mod identity;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{ability::Ability, policy::Policy, role::Role, user::User};
pub use identity::{IdentityProvider, IssuedSession};
pub use repository::{AccessRepository, RoleRepository, SessionSettingsRepository, UserRepository};
pub use token::{SessionClaims, TokenSigner};
