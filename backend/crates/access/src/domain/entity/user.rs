//! User Entity
//!
//! Profile document holding the role assignment. Credentials live with the
//! identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Email, RoleId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<RoleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, email: Email, role_id: Option<RoleId>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            display_name: None,
            role_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn assign_role(&mut self, role_id: RoleId) {
        self.role_id = Some(role_id);
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, display_name: Option<String>) {
        self.display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.updated_at = Utc::now();
    }
}
