//! Access Router

use axum::{
    Router, middleware,
    routing::{MethodRouter, delete, get, patch, post, put},
};
use std::sync::Arc;

use crate::application::config::AccessConfig;
use crate::domain::identity::IdentityProvider;
use crate::domain::repository::AccessRepository;
use crate::presentation::access_rules::{RouteAccess, RouteAccessRules, RouteId};
use crate::presentation::handlers::{self, AccessAppState};
use crate::presentation::middleware::{
    GuardState, csrf_protection, csrf_validation, enforce_route_access, freeze_guard,
};

/// Create the access router with the default route rules
pub fn access_router<R, I>(repo: R, identity: I, config: AccessConfig) -> Router
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    access_router_with_rules(repo, identity, config, RouteAccessRules::default())
}

/// Create the access router with custom route rules
pub fn access_router_with_rules<R, I>(
    repo: R,
    identity: I,
    config: AccessConfig,
    rules: RouteAccessRules,
) -> Router
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let state = AccessAppState {
        repo: Arc::new(repo),
        identity: Arc::new(identity),
        config: Arc::new(config),
    };

    let login = post(handlers::sign_in::<R, I>)
        .route_layer(middleware::from_fn_with_state(
            state.config.clone(),
            csrf_protection,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            freeze_guard::<R, I>,
        ));

    let roles = guarded(get(handlers::list_roles::<R, I>), &state, rules.get(RouteId::ListRoles))
        .merge(guarded(
            post(handlers::create_role::<R, I>),
            &state,
            rules.get(RouteId::CreateRole),
        ));

    let role = guarded(get(handlers::get_role::<R, I>), &state, rules.get(RouteId::GetRole))
        .merge(guarded(
            put(handlers::update_role::<R, I>),
            &state,
            rules.get(RouteId::UpdateRole),
        ))
        .merge(guarded(
            delete(handlers::delete_role::<R, I>),
            &state,
            rules.get(RouteId::DeleteRole),
        ));

    let user = guarded(get(handlers::get_user::<R, I>), &state, rules.get(RouteId::GetUser)).merge(
        guarded(
            patch(handlers::update_user::<R, I>),
            &state,
            rules.get(RouteId::UpdateUser),
        ),
    );

    Router::new()
        .route("/auth/signup", post(handlers::sign_up::<R, I>))
        .route("/auth/login", login)
        .route("/auth/logout", post(handlers::sign_out::<R, I>))
        .route(
            "/auth/logout/all",
            guarded(
                post(handlers::sign_out_everywhere::<R, I>),
                &state,
                rules.get(RouteId::SignOutEverywhere),
            ),
        )
        .route("/auth/refresh", post(handlers::refresh::<R, I>))
        .route("/auth/session", get(handlers::session_status::<R, I>))
        .route(
            "/auth/ability",
            guarded(get(handlers::ability::<R, I>), &state, rules.get(RouteId::Ability)),
        )
        .route("/auth/recover", post(handlers::recover_password::<R, I>))
        .route(
            "/auth/recover/confirm",
            post(handlers::confirm_recovery::<R, I>),
        )
        .route("/roles", roles)
        .route("/roles/{id}", role)
        .route(
            "/users",
            guarded(get(handlers::list_users::<R, I>), &state, rules.get(RouteId::ListUsers)),
        )
        .route("/users/{id}", user)
        .route(
            "/users/{id}/role",
            guarded(put(handlers::assign_role::<R, I>), &state, rules.get(RouteId::AssignRole)),
        )
        .route(
            "/users/{id}/session-settings",
            guarded(
                put(handlers::update_session_settings::<R, I>),
                &state,
                rules.get(RouteId::UpdateSessionSettings),
            ),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            csrf_validation,
        ))
        .with_state(state)
}

/// Attach the policy and privacy guards for `access` to a method router
fn guarded<R, I>(
    route: MethodRouter<AccessAppState<R, I>>,
    state: &AccessAppState<R, I>,
    access: RouteAccess,
) -> MethodRouter<AccessAppState<R, I>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let guard_state = GuardState {
        app: state.clone(),
        access: Arc::new(access),
    };
    route.route_layer(middleware::from_fn_with_state(
        guard_state,
        enforce_route_access::<R, I>,
    ))
}
