//! Access Error Types
//!
//! Access-specific error variants that integrate with the unified
//! `kernel::error::AppError` envelope. Every variant carries a stable
//! machine-readable code (e.g. `SESSIONINCOURSE`).

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Access-specific result type alias
pub type AccessResult<T> = Result<T, AccessError>;

/// Access-specific error variants
#[derive(Debug, Error)]
pub enum AccessError {
    /// A role holds a policy whose allowance is neither CAN nor CANNOT
    #[error("Role '{role}' contains a policy with invalid allowance '{allowance}'")]
    InvalidPolicyInRole { role: String, allowance: String },

    #[error("User not found")]
    UserNotFound,

    #[error("Role not found")]
    RoleNotFound,

    #[error("User has no role assigned")]
    RoleNotAssigned,

    #[error("Role is not active")]
    RoleInactive,

    #[error("Role name already exists")]
    RoleNameTaken,

    /// Login attempted while a session is already in course
    #[error("A session is already in course")]
    SessionInCourse,

    #[error("CSRF token missing")]
    CsrfTokenMissing,

    #[error("CSRF token mismatch")]
    CsrfTokenMismatch,

    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Session token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Caller is neither the owner of the resource nor in an excepted role
    #[error("Access to another user's resource is not allowed")]
    PrivacyViolation,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Password validation failed: {0}")]
    PasswordPolicy(String),

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// No active default role to assign on sign-up
    #[error("No default role configured")]
    NoDefaultRole,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccessError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        use AccessError::*;
        match self {
            InvalidPolicyInRole { .. }
            | InvalidResetToken
            | Validation(_)
            | PasswordPolicy(_)
            | MissingHeader(_) => ErrorKind::BadRequest,
            NotAuthenticated | InvalidToken | TokenExpired | InvalidCredentials => {
                ErrorKind::Unauthorized
            }
            RoleNotAssigned
            | RoleInactive
            | SessionInCourse
            | CsrfTokenMissing
            | CsrfTokenMismatch
            | InsufficientPermissions
            | PrivacyViolation => ErrorKind::Forbidden,
            UserNotFound | RoleNotFound => ErrorKind::NotFound,
            RoleNameTaken | EmailTaken => ErrorKind::Conflict,
            Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                ErrorKind::ServiceUnavailable
            }
            NoDefaultRole | Database(_) | Serialization(_) | Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        use AccessError::*;
        match self {
            InvalidPolicyInRole { .. } => "INVALIDPOLICYINROLE",
            UserNotFound => "USERNOTFOUND",
            RoleNotFound => "ROLENOTFOUND",
            RoleNotAssigned => "ROLENOTASSIGNED",
            RoleInactive => "ROLEINACTIVE",
            RoleNameTaken => "ROLEALREADYEXISTS",
            SessionInCourse => "SESSIONINCOURSE",
            CsrfTokenMissing => "CSRFTOKENMISSING",
            CsrfTokenMismatch => "CSRFTOKENMISMATCH",
            NotAuthenticated => "NOTAUTHENTICATED",
            InvalidToken => "INVALIDTOKEN",
            TokenExpired => "TOKENEXPIRED",
            InsufficientPermissions => "INSUFFICIENTPERMISSIONS",
            PrivacyViolation => "PRIVACYVIOLATION",
            InvalidCredentials => "INVALIDCREDENTIALS",
            EmailTaken => "EMAILALREADYEXISTS",
            InvalidResetToken => "INVALIDRESETTOKEN",
            Validation(_) => "VALIDATIONFAILED",
            PasswordPolicy(_) => "WEAKPASSWORD",
            MissingHeader(_) => "MISSINGHEADER",
            NoDefaultRole => "NODEFAULTROLE",
            Database(_) => "STOREERROR",
            Serialization(_) => "CORRUPTDOCUMENT",
            Internal(_) => "INTERNAL",
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string()).with_code(self.code())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccessError::Database(e) => {
                tracing::error!(error = %e, "Access database error");
            }
            AccessError::Serialization(e) => {
                tracing::error!(error = %e, "Stored document could not be decoded");
            }
            AccessError::Internal(msg) => {
                tracing::error!(message = %msg, "Access internal error");
            }
            AccessError::NoDefaultRole => {
                tracing::error!("Sign-up attempted without an active default role");
            }
            AccessError::InvalidPolicyInRole { role, allowance } => {
                tracing::error!(role = %role, allowance = %allowance, "Role contains an invalid policy");
            }
            AccessError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccessError::SessionInCourse => {
                tracing::warn!("Login attempted while a session is in course");
            }
            AccessError::CsrfTokenMismatch => {
                tracing::warn!("CSRF token mismatch");
            }
            _ => {
                tracing::debug!(error = %self, "Access error");
            }
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::client::FingerprintError> for AccessError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AccessError::MissingHeader(header)
            }
        }
    }
}

impl From<platform::password::PasswordPolicyError> for AccessError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AccessError::PasswordPolicy(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AccessError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AccessError::Internal(err.to_string())
    }
}
