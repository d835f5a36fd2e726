//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`]
//! and the HTTP envelope used for every error response.

use super::app_error::AppError;

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::bad_request("Malformed document").with_source(err)
        } else {
            AppError::internal("Document serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Document not found").with_source(err),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Document store unavailable").with_source(err)
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = match db_err.code().as_deref() {
                    Some("23505") => AppError::conflict("Document already exists"),
                    Some("53000" | "53100" | "53200" | "53300" | "57P01" | "57P03") => {
                        AppError::service_unavailable("Document store unavailable")
                    }
                    _ => AppError::internal("Document store error"),
                };
                app_err.with_source(err)
            }
            _ => AppError::internal("Document store error").with_source(err),
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the logs
        let message = if self.is_server_error() {
            self.kind().as_str()
        } else {
            self.message()
        };

        let body = serde_json::json!({
            "status": self.status_code(),
            "code": self.code(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::kind::ErrorKind;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::BadRequest);
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = AppError::forbidden("denied")
            .with_code("SESSIONINCOURSE")
            .into_response();
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);

        let response = AppError::internal("boom").into_response();
        assert_eq!(
            response.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
