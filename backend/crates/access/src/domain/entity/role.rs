//! Role Entity
//!
//! A named, ordered bundle of policies. Read once per request and never
//! mutated while a request is being authorized.

use serde::{Deserialize, Serialize};

use crate::domain::entity::policy::Policy;
use crate::domain::value_object::RoleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

fn active_by_default() -> bool {
    true
}

impl Role {
    /// New active, non-default role
    pub fn new(name: impl Into<String>, description: impl Into<String>, policies: Vec<Policy>) -> Self {
        Self {
            id: RoleId::new(),
            name: name.into(),
            description: description.into(),
            is_default: false,
            is_active: true,
            policies,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}
