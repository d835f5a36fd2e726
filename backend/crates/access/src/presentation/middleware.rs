//! Access Middleware
//!
//! Guards run as middleware: CSRF validation around the whole router, the
//! freeze guard and CSRF issuance around login, and the policy and privacy
//! guards per route from the [`RouteAccessRules`](super::access_rules::RouteAccessRules).

use std::sync::Arc;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{RawPathParams, Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::cookie::extract_cookie;

use crate::application::config::AccessConfig;
use crate::application::csrf;
use crate::application::{
    AbilityFactory, DenyReason, FreezeGuard, GuardDecision, PolicyGuard, PrivacyGuard,
};
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::AccessRepository;
use crate::presentation::access_rules::RouteAccess;
use crate::presentation::caller::{ClientContext, caller_from_headers, has_signed_session_cookie};
use crate::presentation::handlers::AccessAppState;

/// Middleware state for the per-route guards
pub struct GuardState<R, I> {
    pub app: AccessAppState<R, I>,
    pub access: Arc<RouteAccess>,
}

impl<R, I> Clone for GuardState<R, I> {
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            access: self.access.clone(),
        }
    }
}

/// Validate the double-submit token on state-changing requests
///
/// The `_csrf` parameter is stripped before the handler sees the request.
pub async fn csrf_validation(
    State(config): State<Arc<AccessConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    if !csrf::requires_validation(req.method()) || config.is_csrf_exempt(req.uri().path()) {
        return next.run(req).await;
    }

    let cookie = extract_cookie(req.headers(), &config.csrf_cookie_name);
    let submitted = csrf::query_param(req.uri().query(), &config.csrf_param);

    if let GuardDecision::Denied(reason) = csrf::validate(cookie.as_deref(), submitted) {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            reason = ?reason,
            "CSRF validation failed"
        );
        return reason.into_response();
    }

    match csrf::strip_param(req.uri(), &config.csrf_param) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(err) => return err.into_response(),
    }

    next.run(req).await
}

/// Issue a fresh CSRF cookie on successful responses
pub async fn csrf_protection(
    State(config): State<Arc<AccessConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    if response.status().is_success() {
        let cookie = config
            .csrf_cookie(config.refresh_ttl)
            .set_cookie_header(&csrf::issue_token());
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }

    response
}

/// Refuse login while the browser context holds a session
pub async fn freeze_guard<R, I>(
    State(state): State<AccessAppState<R, I>>,
    req: Request,
    next: Next,
) -> Response
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let has_cookie = has_signed_session_cookie(req.headers(), &state.config);
    let fingerprint = ClientContext::from_parts(req.headers(), req.extensions())
        .ok()
        .map(|ClientContext(fingerprint)| fingerprint);

    match FreezeGuard::new(state.identity.clone())
        .check(has_cookie, fingerprint.as_ref())
        .await
    {
        GuardDecision::Allowed => next.run(req).await,
        GuardDecision::Denied(reason) => reason.into_response(),
    }
}

/// Enforce the route's declared policies, then its ownership rule
pub async fn enforce_route_access<R, I>(
    State(guard): State<GuardState<R, I>>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    req: Request,
    next: Next,
) -> Response
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let access = guard.access.as_ref();
    let caller = caller_from_headers(req.headers(), &guard.app.config).ok();

    if access.authenticated && caller.is_none() {
        return DenyReason::Unauthenticated.into_response();
    }

    let factory = AbilityFactory::new(guard.app.repo.clone());

    let decision = PolicyGuard::new(factory.clone())
        .check(&access.policies, caller.as_ref())
        .await;
    if let GuardDecision::Denied(reason) = decision {
        return reason.into_response();
    }

    if let Some(param) = &access.owner_param {
        let required_id = params.as_ref().ok().and_then(|params| {
            params
                .iter()
                .find(|(name, _)| *name == param.as_str())
                .map(|(_, value)| value)
        });

        let decision = PrivacyGuard::new(factory)
            .check(required_id, caller.as_ref(), &access.excepted_roles)
            .await;
        if let GuardDecision::Denied(reason) = decision {
            return reason.into_response();
        }
    }

    next.run(req).await
}
