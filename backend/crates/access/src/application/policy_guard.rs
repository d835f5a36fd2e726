//! Policy Guard
//!
//! Admits a request when the caller's ability satisfies every policy the
//! route requires. Routes that declare no policy are admitted.

use crate::application::decision::{DenyReason, GuardDecision};
use crate::application::define_ability::AbilityFactory;
use crate::domain::entity::ability::Ability;
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::token::SessionClaims;
use crate::domain::value_object::{Action, Subject};

/// A capability a route requires, optionally on specific fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPolicy {
    pub action: Action,
    pub subject: Subject,
    pub fields: Option<Vec<String>>,
}

impl RequiredPolicy {
    pub fn new(action: Action, subject: Subject) -> Self {
        Self {
            action,
            subject,
            fields: None,
        }
    }

    pub fn on_fields<F, S>(action: Action, subject: Subject, fields: F) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action,
            subject,
            fields: Some(fields.into_iter().map(Into::into).collect()),
        }
    }

    /// Field-scoped requirements need every listed field
    pub fn is_satisfied_by(&self, ability: &Ability) -> bool {
        match &self.fields {
            Some(fields) if !fields.is_empty() => fields
                .iter()
                .all(|field| ability.can_field(self.action, self.subject, field)),
            _ => ability.can(self.action, self.subject),
        }
    }
}

pub struct PolicyGuard<R> {
    factory: AbilityFactory<R>,
}

impl<R> PolicyGuard<R>
where
    R: UserRepository + RoleRepository + Send + Sync,
{
    pub fn new(factory: AbilityFactory<R>) -> Self {
        Self { factory }
    }

    pub async fn check(
        &self,
        required: &[RequiredPolicy],
        caller: Option<&SessionClaims>,
    ) -> GuardDecision {
        if required.is_empty() {
            tracing::debug!("No policy declared, admitting");
            return GuardDecision::Allowed;
        }

        let Some(caller) = caller else {
            return GuardDecision::Denied(DenyReason::Unauthenticated);
        };

        let ability = match self.factory.define_ability(&caller.user_id()).await {
            Ok(ability) => ability,
            Err(err) => return GuardDecision::from_error(err),
        };

        if let Some(missing) = required.iter().find(|policy| !policy.is_satisfied_by(&ability)) {
            tracing::warn!(
                user_id = %caller.id,
                action = %missing.action,
                subject = %missing.subject,
                "Policy check failed"
            );
            return GuardDecision::Denied(DenyReason::MissingCapability {
                action: missing.action,
                subject: missing.subject,
            });
        }

        GuardDecision::Allowed
    }
}
