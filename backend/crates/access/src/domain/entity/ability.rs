//! Ability
//!
//! Request-scoped permission evaluator compiled from a role's policies.
//!
//! Rules are kept in declaration order and evaluated by a left fold: every
//! rule matching the query overwrites the running verdict, so the last
//! matching rule wins. No match means "not allowed".

use serde::Serialize;

use crate::domain::entity::role::Role;
use crate::domain::value_object::{Action, Allowance, Subject};
use crate::error::{AccessError, AccessResult};

/// Compiled grant (`inverted == false`) or deny rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub action: Action,
    pub subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inverted: bool,
}

impl Rule {
    fn applies_to(&self, action: Action, subject: Subject) -> bool {
        self.action.covers(action) && self.subject.covers(subject)
    }

    fn matches_field(&self, field: Option<&str>) -> bool {
        match (&self.fields, field) {
            (None, _) => true,
            (Some(fields), Some(field)) => fields.iter().any(|f| f == field),
            // Subject-level query: a field-scoped grant still answers "some
            // access", a field-scoped denial does not revoke the whole subject.
            (Some(_), None) => !self.inverted,
        }
    }
}

/// Fold `rules` left to right; the last matching rule decides
pub fn evaluate(rules: &[Rule], action: Action, subject: Subject, field: Option<&str>) -> bool {
    rules.iter().fold(false, |allowed, rule| {
        if rule.applies_to(action, subject) && rule.matches_field(field) {
            !rule.inverted
        } else {
            allowed
        }
    })
}

#[derive(Debug, Clone, Default)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    /// Replay a role's policies in order
    ///
    /// ## Errors
    /// * `InvalidPolicyInRole` - an allowance other than `CAN` / `CANNOT`
    pub fn compile(role: &Role) -> AccessResult<Self> {
        let mut builder = AbilityBuilder::new();

        for policy in &role.policies {
            let fields = policy.field_scope();
            match policy.allowance() {
                Some(Allowance::Can) => builder.can(policy.action, policy.subject, fields),
                Some(Allowance::Cannot) => builder.cannot(policy.action, policy.subject, fields),
                None => {
                    return Err(AccessError::InvalidPolicyInRole {
                        role: role.name.clone(),
                        allowance: policy.allowance.clone(),
                    });
                }
            };
        }

        Ok(builder.build())
    }

    pub fn can(&self, action: Action, subject: Subject) -> bool {
        evaluate(&self.rules, action, subject, None)
    }

    pub fn cannot(&self, action: Action, subject: Subject) -> bool {
        !self.can(action, subject)
    }

    pub fn can_field(&self, action: Action, subject: Subject, field: &str) -> bool {
        evaluate(&self.rules, action, subject, Some(field))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

#[derive(Debug, Default)]
pub struct AbilityBuilder {
    rules: Vec<Rule>,
}

impl AbilityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can(&mut self, action: Action, subject: Subject, fields: Option<Vec<String>>) -> &mut Self {
        self.push(action, subject, fields, false)
    }

    pub fn cannot(&mut self, action: Action, subject: Subject, fields: Option<Vec<String>>) -> &mut Self {
        self.push(action, subject, fields, true)
    }

    fn push(
        &mut self,
        action: Action,
        subject: Subject,
        fields: Option<Vec<String>>,
        inverted: bool,
    ) -> &mut Self {
        self.rules.push(Rule {
            action,
            subject,
            fields,
            inverted,
        });
        self
    }

    pub fn build(self) -> Ability {
        Ability { rules: self.rules }
    }
}
