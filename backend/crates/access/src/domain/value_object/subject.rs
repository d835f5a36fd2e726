use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Resource kind a policy applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Subject {
    /// Wildcard: every subject
    #[serde(rename = "all")]
    #[display("all")]
    All,
    #[display("User")]
    User,
    #[display("Role")]
    Role,
    #[display("Media")]
    Media,
    #[display("Ebook")]
    Ebook,
    #[display("Section")]
    Section,
    #[display("Message")]
    Message,
    #[display("Tag")]
    Tag,
    #[display("Coupon")]
    Coupon,
    #[display("Payment")]
    Payment,
}

impl Subject {
    #[inline]
    pub fn covers(self, requested: Subject) -> bool {
        self == Subject::All || self == requested
    }
}
