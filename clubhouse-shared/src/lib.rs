//! # Clubhouse Shared Library
//!
//! This crate contains the domain models, database layer, authentication
//! primitives, and the signup/capacity/payment workflow shared by the
//! Clubhouse API server and CLI.
//!
//! ## Module Organization
//!
//! - `models`: Database models and the core signup/payment workflow
//! - `db`: Connection pool and migration runner
//! - `auth`: Password hashing, signed session principals, role guards
//! - `external`: Best-effort calendar and mail adapters plus the
//!   post-commit intent dispatcher

pub mod auth;
pub mod db;
pub mod external;
pub mod models;

/// Current version of the Clubhouse shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
