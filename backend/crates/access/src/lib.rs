//! Access Backend Module
//!
//! Policy-based authorization and the login/session flow around it.
//!
//! Clean Architecture structure:
//! - `domain/` - Roles, policies, abilities, identity-provider port
//! - `application/` - Guards and use cases
//! - `infra/` - Document store clients and the identity provider
//! - `presentation/` - HTTP handlers, guard middleware, router
//!
//! ## Security Model
//! - The caller is named by an HMAC-signed session cookie carrying the
//!   identity provider's bearer token
//! - Every capability check resolves the caller's single active role and
//!   fails closed on any lookup error
//! - State-changing requests carry a double-submit CSRF token
//! - A browser context holding a session cannot log in again

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AccessConfig;
pub use application::seed::seed_default_roles;
pub use domain::identity::IdentityProvider;
pub use error::{AccessError, AccessResult};
pub use infra::{
    DocumentIdentityProvider, DocumentRepository, DocumentStore, MemoryDocumentStore,
    PgDocumentStore,
};
pub use presentation::router::{access_router, access_router_with_rules};

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};
