//! Request Identity
//!
//! The caller is whoever the signed session cookie names. The cookie's HMAC
//! is verified here; the bearer token inside is only decoded.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use platform::client::{ClientFingerprint, extract_client_ip, extract_fingerprint};
use platform::cookie::extract_signed_cookie;

use crate::application::config::AccessConfig;
use crate::domain::token::{SessionClaims, decode_unverified};
use crate::error::{AccessError, AccessResult};

/// Claims of the signed session cookie, expired or not
///
/// ## Errors
/// * `NotAuthenticated` - no cookie, or its signature does not verify
/// * `InvalidToken` - the token inside cannot be decoded
pub fn session_claims_from_headers(
    headers: &HeaderMap,
    config: &AccessConfig,
) -> AccessResult<SessionClaims> {
    let token = extract_signed_cookie(headers, &config.session_cookie_name, &config.cookie_secret)
        .ok_or(AccessError::NotAuthenticated)?;
    decode_unverified(&token)
}

/// Claims of the signed session cookie
///
/// ## Errors
/// * `NotAuthenticated` - no cookie, or its signature does not verify
/// * `InvalidToken` - the token inside cannot be decoded
/// * `TokenExpired` - the claims have expired
pub fn caller_from_headers(headers: &HeaderMap, config: &AccessConfig) -> AccessResult<SessionClaims> {
    let claims = session_claims_from_headers(headers, config)?;
    if claims.is_expired() {
        return Err(AccessError::TokenExpired);
    }
    Ok(claims)
}

/// Whether the request carries a session cookie with a valid signature
pub fn has_signed_session_cookie(headers: &HeaderMap, config: &AccessConfig) -> bool {
    extract_signed_cookie(headers, &config.session_cookie_name, &config.cookie_secret).is_some()
}

/// Authenticated caller; rejects with 401
pub struct Caller(pub SessionClaims);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    Arc<AccessConfig>: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AccessConfig>::from_ref(state);
        caller_from_headers(&parts.headers, &config).map(Caller)
    }
}

/// Caller if there is one
pub struct MaybeCaller(pub Option<SessionClaims>);

impl<S> FromRequestParts<S> for MaybeCaller
where
    S: Send + Sync,
    Arc<AccessConfig>: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AccessConfig>::from_ref(state);
        Ok(MaybeCaller(caller_from_headers(&parts.headers, &config).ok()))
    }
}

/// Session named by the signed cookie even after its bearer expired
///
/// Sign-out uses this so an expired bearer still revokes its session.
pub struct SessionCookie(pub Option<SessionClaims>);

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
    Arc<AccessConfig>: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AccessConfig>::from_ref(state);
        Ok(SessionCookie(
            session_claims_from_headers(&parts.headers, &config).ok(),
        ))
    }
}

/// Browser context of the request; rejects with 400 without a User-Agent
pub struct ClientContext(pub ClientFingerprint);

impl ClientContext {
    pub fn from_parts(headers: &HeaderMap, extensions: &axum::http::Extensions) -> AccessResult<Self> {
        let client_ip = extract_client_ip(headers, extensions);
        Ok(ClientContext(extract_fingerprint(headers, client_ip)?))
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        ClientContext::from_parts(&parts.headers, &parts.extensions)
    }
}
