//! Entities

pub mod ability;
pub mod credential;
pub mod idp_session;
pub mod mail;
pub mod policy;
pub mod role;
pub mod session_settings;
pub mod user;
