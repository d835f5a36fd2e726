//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, random tokens)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management, including HMAC-signed cookie values
//! - Client fingerprinting

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
