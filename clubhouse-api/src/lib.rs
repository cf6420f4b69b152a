//! # Clubhouse API Server Library
//!
//! Core functionality for the Clubhouse API server: a JSON HTTP surface
//! over the club activity domain in `clubhouse-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, session middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
