//! Application Layer
//!
//! Guards, use cases and application services.

pub mod check_session;
pub mod config;
pub mod csrf;
pub mod decision;
pub mod define_ability;
pub mod freeze_guard;
pub mod manage_roles;
pub mod policy_guard;
pub mod privacy_guard;
pub mod recover_password;
pub mod refresh_session;
pub mod seed;
pub mod session_lifetimes;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod user_profile;

// Re-exports
pub use check_session::{CheckSessionUseCase, SessionStatus};
pub use config::AccessConfig;
pub use decision::{DenyReason, GuardDecision};
pub use define_ability::AbilityFactory;
pub use freeze_guard::{FreezeGuard, FreezeState};
pub use manage_roles::{ManageRolesUseCase, RoleInput};
pub use policy_guard::{PolicyGuard, RequiredPolicy};
pub use privacy_guard::PrivacyGuard;
pub use recover_password::RecoverPasswordUseCase;
pub use refresh_session::RefreshSessionUseCase;
pub use seed::seed_default_roles;
pub use session_lifetimes::SessionLifetimeService;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use user_profile::UserProfileUseCase;
