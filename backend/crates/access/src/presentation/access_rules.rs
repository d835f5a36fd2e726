//! Route Access Rules
//!
//! Declarative guard metadata per route: the policies a caller must hold,
//! the path parameter naming the owner, and the roles exempt from the
//! ownership check.

use std::collections::HashMap;

use crate::application::policy_guard::RequiredPolicy;
use crate::application::seed::ADMIN_ROLE;
use crate::domain::value_object::{Action, Subject};

/// Guarded routes of the access router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteId {
    Ability,
    SignOutEverywhere,
    ListRoles,
    CreateRole,
    GetRole,
    UpdateRole,
    DeleteRole,
    ListUsers,
    GetUser,
    UpdateUser,
    AssignRole,
    UpdateSessionSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAccess {
    pub policies: Vec<RequiredPolicy>,
    /// Path parameter holding the owner's user id
    pub owner_param: Option<String>,
    pub excepted_roles: Vec<String>,
    /// Reject anonymous callers even without policies
    pub authenticated: bool,
}

impl RouteAccess {
    /// No guard at all
    pub fn open() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            ..Self::default()
        }
    }

    pub fn policy(mut self, action: Action, subject: Subject) -> Self {
        self.policies.push(RequiredPolicy::new(action, subject));
        self
    }

    pub fn policy_on_fields<F, S>(mut self, action: Action, subject: Subject, fields: F) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policies
            .push(RequiredPolicy::on_fields(action, subject, fields));
        self
    }

    pub fn owner(mut self, param: impl Into<String>) -> Self {
        self.owner_param = Some(param.into());
        self.authenticated = true;
        self
    }

    pub fn except_roles<F, S>(mut self, roles: F) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excepted_roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub struct RouteAccessRules {
    rules: HashMap<RouteId, RouteAccess>,
}

impl RouteAccessRules {
    /// Every route open
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn with(mut self, route: RouteId, access: RouteAccess) -> Self {
        self.rules.insert(route, access);
        self
    }

    /// Routes without an entry are open
    pub fn get(&self, route: RouteId) -> RouteAccess {
        self.rules.get(&route).cloned().unwrap_or_default()
    }
}

impl Default for RouteAccessRules {
    fn default() -> Self {
        use Action::*;

        Self::empty()
            .with(RouteId::Ability, RouteAccess::authenticated())
            .with(RouteId::SignOutEverywhere, RouteAccess::authenticated())
            .with(RouteId::ListRoles, RouteAccess::open().policy(Read, Subject::Role))
            .with(RouteId::CreateRole, RouteAccess::open().policy(Create, Subject::Role))
            .with(RouteId::GetRole, RouteAccess::open().policy(Read, Subject::Role))
            .with(RouteId::UpdateRole, RouteAccess::open().policy(Update, Subject::Role))
            .with(RouteId::DeleteRole, RouteAccess::open().policy(Delete, Subject::Role))
            .with(RouteId::ListUsers, RouteAccess::open().policy(Read, Subject::User))
            .with(
                RouteId::GetUser,
                RouteAccess::open().owner("id").except_roles([ADMIN_ROLE]),
            )
            .with(
                RouteId::UpdateUser,
                RouteAccess::open().owner("id").except_roles([ADMIN_ROLE]),
            )
            .with(
                RouteId::AssignRole,
                RouteAccess::open().policy_on_fields(Update, Subject::User, ["roleId"]),
            )
            .with(
                RouteId::UpdateSessionSettings,
                RouteAccess::open().policy_on_fields(
                    Update,
                    Subject::User,
                    ["sessionTtlSecs", "refreshTtlSecs"],
                ),
            )
    }
}
