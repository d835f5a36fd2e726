//! Value Objects

pub mod action;
pub mod allowance;
pub mod email;
pub mod ids;
pub mod subject;

pub use action::Action;
pub use allowance::Allowance;
pub use email::Email;
pub use ids::{IdpSessionId, MailId, RoleId, UserId};
pub use subject::Subject;
