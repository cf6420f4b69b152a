/// API route handlers
///
/// This module contains all HTTP route handlers organized by domain:
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout
/// - `activities`: Activity catalog CRUD with calendar sync
/// - `signups`: Registration for activities and roster management
/// - `payments`: Payment verification workflow
/// - `admin`: User and invitation code administration
/// - `contact`: Public membership request form

pub mod activities;
pub mod admin;
pub mod auth;
pub mod contact;
pub mod health;
pub mod payments;
pub mod signups;
