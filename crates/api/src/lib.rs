//! Orchard API library.
//!
//! This crate provides the API server functionality as a library,
//! allowing it to be tested and reused (the CLI uses it for migrations
//! and user bootstrap).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validate;

/// Embedded sqlx migrations (`crates/api/migrations/`).
///
/// Run explicitly via `orchard-cli migrate`; never on server startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
