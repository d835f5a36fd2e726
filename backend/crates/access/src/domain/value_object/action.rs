use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Operation kind a policy grants or denies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Wildcard: every action
    #[display("manage")]
    Manage,
    #[display("create")]
    Create,
    #[display("read")]
    Read,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
}

impl Action {
    /// Whether a rule declared for `self` applies to a check for `requested`
    #[inline]
    pub fn covers(self, requested: Action) -> bool {
        self == Action::Manage || self == requested
    }
}
