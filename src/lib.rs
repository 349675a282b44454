//! Qase dashboard server library.
//!
//! Fetches test cases and suites from Qase, builds the suite forest, scopes it to a
//! configured root suite and computes automation statistics for the dashboard.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
