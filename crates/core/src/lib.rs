//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `api` - The HTTP API server
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, phone
//!   numbers, capability groups, and order codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
