//! Outbound Mail
//!
//! Hand-off document for the external mail service. Delivery itself is not
//! handled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{Email, MailId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMail {
    pub id: MailId,
    pub to: Email,
    pub kind: MailKind,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl OutboundMail {
    pub fn password_reset(to: Email, token: String) -> Self {
        Self {
            id: MailId::new(),
            to,
            kind: MailKind::PasswordReset,
            token,
            created_at: Utc::now(),
        }
    }
}
