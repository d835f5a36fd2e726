//! Presentation Layer
//!
//! HTTP handlers, guard middleware and routing.

pub mod access_rules;
pub mod caller;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use access_rules::{RouteAccess, RouteAccessRules, RouteId};
pub use router::{access_router, access_router_with_rules};
