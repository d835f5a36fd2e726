//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRef, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use platform::cookie::{extract_signed_cookie, sign_value};

use crate::application::config::AccessConfig;
use crate::application::{
    AbilityFactory, CheckSessionUseCase, ManageRolesUseCase, RecoverPasswordUseCase,
    RefreshSessionUseCase, RoleInput, SessionLifetimeService, SignInInput, SignInUseCase,
    SignOutUseCase, SignUpInput, SignUpUseCase, UserProfileUseCase,
};
use crate::domain::identity::{IdentityProvider, IssuedSession};
use crate::domain::repository::AccessRepository;
use crate::domain::value_object::{RoleId, UserId};
use crate::error::AccessResult;
use crate::presentation::caller::{Caller, ClientContext, MaybeCaller, SessionCookie};
use crate::presentation::dto::{
    AbilityResponse, AssignRoleRequest, RecoverConfirmRequest, RecoverRequest, RefreshResponse,
    RoleRequest, SessionSettingsRequest, SessionSettingsResponse, SignInRequest, SignInResponse,
    SignOutAllResponse, SignUpRequest, UpdateUserRequest, UserResponse,
};

/// Shared state for access handlers
pub struct AccessAppState<R, I> {
    pub repo: Arc<R>,
    pub identity: Arc<I>,
    pub config: Arc<AccessConfig>,
}

impl<R, I> Clone for AccessAppState<R, I> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            identity: self.identity.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, I> FromRef<AccessAppState<R, I>> for Arc<AccessConfig> {
    fn from_ref(state: &AccessAppState<R, I>) -> Self {
        state.config.clone()
    }
}

impl<R, I> AccessAppState<R, I>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    fn lifetimes(&self) -> SessionLifetimeService<R> {
        SessionLifetimeService::new(self.repo.clone(), self.config.default_lifetimes())
    }

    /// Set-Cookie values for a freshly issued or refreshed session
    fn session_cookies(&self, session: &IssuedSession) -> [(header::HeaderName, String); 2] {
        let config = &self.config;
        [
            (
                header::SET_COOKIE,
                config
                    .session_cookie(session.bearer_expires_in)
                    .build_set_cookie(&sign_value(&config.cookie_secret, &session.bearer_token)),
            ),
            (
                header::SET_COOKIE,
                config
                    .refresh_cookie(session.refresh_expires_in)
                    .build_set_cookie(&sign_value(&config.cookie_secret, &session.refresh_token)),
            ),
        ]
    }
}

// ============================================================================
// Sign Up / Sign In / Sign Out
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Json(req): Json<SignUpRequest>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.identity.clone());
    let output = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(output.user))))
}

/// POST /auth/login
///
/// Guarded by the freeze guard; the CSRF cookie is added by the layer
/// around this handler.
pub async fn sign_in<R, I>(
    State(state): State<AccessAppState<R, I>>,
    ClientContext(fingerprint): ClientContext,
    Json(req): Json<SignInRequest>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.identity.clone(), state.lifetimes());
    let output = use_case
        .execute(
            SignInInput {
                email: req.email,
                password: req.password,
            },
            &fingerprint,
        )
        .await?;

    Ok((
        AppendHeaders(state.session_cookies(&output.session)),
        Json(SignInResponse {
            user: UserResponse::from(output.user),
            expires_in: output.session.bearer_expires_in.as_secs(),
        }),
    ))
}

/// POST /auth/logout
///
/// Always 204; every access cookie is cleared. An expired bearer still
/// revokes the session it names.
pub async fn sign_out<R, I>(
    State(state): State<AccessAppState<R, I>>,
    SessionCookie(claims): SessionCookie,
) -> impl IntoResponse
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    SignOutUseCase::new(state.identity.clone())
        .execute(claims.as_ref())
        .await;

    let config = &state.config;
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (header::SET_COOKIE, config.session_cookie(config.session_ttl).build_delete_cookie()),
            (header::SET_COOKIE, config.refresh_cookie(config.refresh_ttl).build_delete_cookie()),
            (header::SET_COOKIE, config.csrf_cookie(config.refresh_ttl).build_delete_cookie()),
        ]),
    )
}

/// POST /auth/logout/all
pub async fn sign_out_everywhere<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Caller(caller): Caller,
) -> AccessResult<Json<SignOutAllResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let revoked = SignOutUseCase::new(state.identity.clone())
        .execute_all(&caller)
        .await?;
    Ok(Json(SignOutAllResponse { revoked }))
}

/// POST /auth/refresh
pub async fn refresh<R, I>(
    State(state): State<AccessAppState<R, I>>,
    ClientContext(fingerprint): ClientContext,
    headers: axum::http::HeaderMap,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let refresh_token = extract_signed_cookie(
        &headers,
        &state.config.refresh_cookie_name,
        &state.config.cookie_secret,
    );

    let session = RefreshSessionUseCase::new(state.identity.clone())
        .execute(refresh_token.as_deref(), &fingerprint)
        .await?;

    Ok((
        AppendHeaders(state.session_cookies(&session)),
        Json(RefreshResponse {
            expires_in: session.bearer_expires_in.as_secs(),
        }),
    ))
}

// ============================================================================
// Session Status / Ability
// ============================================================================

/// GET /auth/session
pub async fn session_status<R, I>(
    State(state): State<AccessAppState<R, I>>,
    MaybeCaller(caller): MaybeCaller,
) -> impl IntoResponse
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let use_case = CheckSessionUseCase::new(AbilityFactory::new(state.repo.clone()));
    Json(use_case.execute(caller.as_ref()).await)
}

/// GET /auth/ability
pub async fn ability<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Caller(caller): Caller,
) -> AccessResult<Json<AbilityResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let ability = AbilityFactory::new(state.repo.clone())
        .define_ability(&caller.user_id())
        .await?;

    Ok(Json(AbilityResponse {
        rules: ability.rules().to_vec(),
    }))
}

// ============================================================================
// Password Recovery
// ============================================================================

/// POST /auth/recover
pub async fn recover_password<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Json(req): Json<RecoverRequest>,
) -> AccessResult<StatusCode>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    RecoverPasswordUseCase::new(state.identity.clone())
        .request(&req.email)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /auth/recover/confirm
pub async fn confirm_recovery<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Json(req): Json<RecoverConfirmRequest>,
) -> AccessResult<StatusCode>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    RecoverPasswordUseCase::new(state.identity.clone())
        .confirm(&req.token, req.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Roles
// ============================================================================

fn role_input(req: RoleRequest) -> RoleInput {
    RoleInput {
        name: req.name,
        description: req.description,
        is_default: req.is_default,
        is_active: req.is_active,
        policies: req.policies,
    }
}

/// GET /roles
pub async fn list_roles<R, I>(
    State(state): State<AccessAppState<R, I>>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let roles = ManageRolesUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(roles))
}

/// POST /roles
pub async fn create_role<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Json(req): Json<RoleRequest>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let role = ManageRolesUseCase::new(state.repo.clone())
        .create(role_input(req))
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// GET /roles/{id}
pub async fn get_role<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(role_id): Path<String>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let role = ManageRolesUseCase::new(state.repo.clone())
        .get(&RoleId::from_string(role_id))
        .await?;
    Ok(Json(role))
}

/// PUT /roles/{id}
pub async fn update_role<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(role_id): Path<String>,
    Json(req): Json<RoleRequest>,
) -> AccessResult<impl IntoResponse>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let role = ManageRolesUseCase::new(state.repo.clone())
        .update(&RoleId::from_string(role_id), role_input(req))
        .await?;
    Ok(Json(role))
}

/// DELETE /roles/{id}
pub async fn delete_role<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(role_id): Path<String>,
) -> AccessResult<StatusCode>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    ManageRolesUseCase::new(state.repo.clone())
        .delete(&RoleId::from_string(role_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Users
// ============================================================================

/// GET /users
pub async fn list_users<R, I>(
    State(state): State<AccessAppState<R, I>>,
) -> AccessResult<Json<Vec<UserResponse>>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let users = UserProfileUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/{id}
pub async fn get_user<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(user_id): Path<String>,
) -> AccessResult<Json<UserResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let user = UserProfileUseCase::new(state.repo.clone())
        .get(&UserId::from_string(user_id))
        .await?;
    Ok(Json(user.into()))
}

/// PATCH /users/{id}
pub async fn update_user<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AccessResult<Json<UserResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let user = UserProfileUseCase::new(state.repo.clone())
        .update(&UserId::from_string(user_id), req.display_name)
        .await?;
    Ok(Json(user.into()))
}

/// PUT /users/{id}/role
pub async fn assign_role<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(user_id): Path<String>,
    Json(req): Json<AssignRoleRequest>,
) -> AccessResult<Json<UserResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let user = ManageRolesUseCase::new(state.repo.clone())
        .assign_role(
            &UserId::from_string(user_id),
            &RoleId::from_string(req.role_id),
        )
        .await?;
    Ok(Json(user.into()))
}

/// PUT /users/{id}/session-settings
pub async fn update_session_settings<R, I>(
    State(state): State<AccessAppState<R, I>>,
    Path(user_id): Path<String>,
    Json(req): Json<SessionSettingsRequest>,
) -> AccessResult<Json<SessionSettingsResponse>>
where
    R: AccessRepository,
    I: IdentityProvider + Send + Sync + 'static,
{
    let user_id = UserId::from_string(user_id);
    UserProfileUseCase::new(state.repo.clone()).get(&user_id).await?;

    let lifetimes = state
        .lifetimes()
        .update(&user_id, req.session_ttl_secs, req.refresh_ttl_secs)
        .await?;

    Ok(Json(SessionSettingsResponse {
        session_ttl_secs: lifetimes.session.as_secs(),
        refresh_ttl_secs: lifetimes.refresh.as_secs(),
    }))
}
