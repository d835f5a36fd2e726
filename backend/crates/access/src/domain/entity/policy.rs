//! Policy Entity
//!
//! A single grant/deny rule inside a role, optionally scoped to fields.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Action, Allowance, Subject};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub action: Action,
    pub subject: Subject,
    /// Raw allowance code, validated when the ability is compiled
    pub allowance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

impl Policy {
    pub fn new(action: Action, subject: Subject, allowance: Allowance) -> Self {
        Self {
            action,
            subject,
            allowance: allowance.code().to_string(),
            fields: None,
        }
    }

    pub fn can(action: Action, subject: Subject) -> Self {
        Self::new(action, subject, Allowance::Can)
    }

    pub fn cannot(action: Action, subject: Subject) -> Self {
        Self::new(action, subject, Allowance::Cannot)
    }

    pub fn with_fields<F, S>(mut self, fields: F) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Parsed allowance; `None` for anything but `CAN` / `CANNOT`
    pub fn allowance(&self) -> Option<Allowance> {
        Allowance::from_code(&self.allowance)
    }

    /// Field set with duplicates dropped (first occurrence kept)
    ///
    /// An empty list means the policy is not field-scoped.
    pub fn field_scope(&self) -> Option<Vec<String>> {
        let fields = self.fields.as_ref()?;
        let mut scope: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !scope.contains(field) {
                scope.push(field.clone());
            }
        }
        (!scope.is_empty()).then_some(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_scope_dedupes_in_order() {
        let policy =
            Policy::can(Action::Update, Subject::User).with_fields(["email", "name", "email"]);
        assert_eq!(
            policy.field_scope(),
            Some(vec!["email".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_empty_fields_are_unscoped() {
        let policy = Policy::can(Action::Read, Subject::User).with_fields(Vec::<String>::new());
        assert_eq!(policy.field_scope(), None);
        assert_eq!(Policy::can(Action::Read, Subject::User).field_scope(), None);
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::json!({
            "action": "read",
            "subject": "User",
            "allowance": "CAN"
        });
        let policy: Policy = serde_json::from_value(json).unwrap();
        assert_eq!(policy, Policy::can(Action::Read, Subject::User));
        assert_eq!(policy.allowance(), Some(Allowance::Can));
    }
}
