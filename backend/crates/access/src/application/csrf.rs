//! CSRF Protection
//!
//! Double-submit token: issued in a script-readable cookie on login, echoed
//! back by the client as a query parameter on every state-changing request.

use axum::http::{Method, Uri, uri::PathAndQuery};
use platform::crypto::{constant_time_eq, random_token};

use crate::application::decision::{DenyReason, GuardDecision};
use crate::error::{AccessError, AccessResult};

/// Bytes of entropy in a CSRF token
const CSRF_TOKEN_BYTES: usize = 32;

pub fn issue_token() -> String {
    random_token(CSRF_TOKEN_BYTES)
}

pub fn requires_validation(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// First value of `name` in a raw query string
pub fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn validate(cookie: Option<&str>, submitted: Option<&str>) -> GuardDecision {
    let (Some(cookie), Some(submitted)) = (cookie, submitted) else {
        return GuardDecision::Denied(DenyReason::CsrfTokenMissing);
    };
    if cookie.is_empty() || submitted.is_empty() {
        return GuardDecision::Denied(DenyReason::CsrfTokenMissing);
    }

    if constant_time_eq(cookie.as_bytes(), submitted.as_bytes()) {
        GuardDecision::Allowed
    } else {
        GuardDecision::Denied(DenyReason::CsrfTokenMismatch)
    }
}

/// Remove every occurrence of `name` from the query, keeping the rest in order
pub fn strip_param(uri: &Uri, name: &str) -> AccessResult<Uri> {
    let Some(query) = uri.query() else {
        return Ok(uri.clone());
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(name))
        .collect();

    let path_and_query = if kept.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), kept.join("&"))
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| AccessError::Internal(format!("Failed to rebuild request URI: {e}")))?,
    );
    Uri::from_parts(parts)
        .map_err(|e| AccessError::Internal(format!("Failed to rebuild request URI: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_changing_methods() {
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(requires_validation(&method));
        }
        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            assert!(!requires_validation(&method));
        }
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let a = issue_token();
        assert_ne!(a, issue_token());
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(Some("abc"), Some("abc")), GuardDecision::Allowed);
        assert_eq!(
            validate(Some("abc"), Some("abd")),
            GuardDecision::Denied(DenyReason::CsrfTokenMismatch)
        );
        assert_eq!(
            validate(None, Some("abc")),
            GuardDecision::Denied(DenyReason::CsrfTokenMissing)
        );
        assert_eq!(
            validate(Some("abc"), None),
            GuardDecision::Denied(DenyReason::CsrfTokenMissing)
        );
        assert_eq!(
            validate(Some(""), Some("")),
            GuardDecision::Denied(DenyReason::CsrfTokenMissing)
        );
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param(Some("a=1&_csrf=tok&b=2"), "_csrf"), Some("tok"));
        assert_eq!(query_param(Some("_csrf"), "_csrf"), Some(""));
        assert_eq!(query_param(Some("a=1"), "_csrf"), None);
        assert_eq!(query_param(None, "_csrf"), None);
    }

    #[test]
    fn test_strip_param() {
        let uri: Uri = "/roles/1?_csrf=tok&expand=policies".parse().unwrap();
        assert_eq!(strip_param(&uri, "_csrf").unwrap(), "/roles/1?expand=policies");

        let only: Uri = "/auth/logout?_csrf=tok".parse().unwrap();
        assert_eq!(strip_param(&only, "_csrf").unwrap(), "/auth/logout");

        let none: Uri = "/roles".parse().unwrap();
        assert_eq!(strip_param(&none, "_csrf").unwrap(), "/roles");
    }
}
