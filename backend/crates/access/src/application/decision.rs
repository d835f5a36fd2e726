//! Guard Decisions
//!
//! Guards never signal denial by failing: they return a [`GuardDecision`]
//! and the HTTP layer turns `Denied` into a response.

use axum::response::{IntoResponse, Response};

use crate::domain::value_object::{Action, Subject};
use crate::error::AccessError;

#[derive(Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Denied(DenyReason),
}

#[derive(Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No (valid) session cookie
    Unauthenticated,
    /// A required capability is missing
    MissingCapability { action: Action, subject: Subject },
    /// The caller's role could not be resolved (no user, role, or active role)
    NoActiveRole,
    /// The caller's role holds a malformed policy
    InvalidPolicy { role: String, allowance: String },
    /// Caller is not the owner and not in an excepted role
    NotOwner,
    /// Login attempted while a session is in course
    SessionInCourse,
    /// The client did not identify itself (no User-Agent)
    UnidentifiedClient,
    CsrfTokenMissing,
    CsrfTokenMismatch,
    /// The decision could not be evaluated (store failure)
    Unavailable,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allowed)
    }

    /// Fail closed: any error while evaluating a guard denies
    pub fn from_error(err: AccessError) -> Self {
        let reason = match err {
            AccessError::InvalidPolicyInRole { role, allowance } => {
                DenyReason::InvalidPolicy { role, allowance }
            }
            AccessError::UserNotFound
            | AccessError::RoleNotFound
            | AccessError::RoleNotAssigned
            | AccessError::RoleInactive => DenyReason::NoActiveRole,
            AccessError::NotAuthenticated | AccessError::InvalidToken | AccessError::TokenExpired => {
                DenyReason::Unauthenticated
            }
            other => {
                tracing::error!(error = %other, "Guard evaluation failed, denying");
                DenyReason::Unavailable
            }
        };
        GuardDecision::Denied(reason)
    }
}

impl From<DenyReason> for AccessError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AccessError::NotAuthenticated,
            DenyReason::MissingCapability { .. } | DenyReason::NoActiveRole => {
                AccessError::InsufficientPermissions
            }
            DenyReason::InvalidPolicy { role, allowance } => {
                AccessError::InvalidPolicyInRole { role, allowance }
            }
            DenyReason::NotOwner => AccessError::PrivacyViolation,
            DenyReason::SessionInCourse => AccessError::SessionInCourse,
            DenyReason::UnidentifiedClient => AccessError::MissingHeader("User-Agent".to_string()),
            DenyReason::CsrfTokenMissing => AccessError::CsrfTokenMissing,
            DenyReason::CsrfTokenMismatch => AccessError::CsrfTokenMismatch,
            DenyReason::Unavailable => {
                AccessError::Internal("Authorization could not be evaluated".to_string())
            }
        }
    }
}

impl IntoResponse for DenyReason {
    fn into_response(self) -> Response {
        AccessError::from(self).into_response()
    }
}
