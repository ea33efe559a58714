//! Business logic services.
//!
//! Services validate request payloads, enforce domain rules, and drive the
//! repositories. Handlers stay thin: permission check, service call,
//! response shaping.

pub mod auth;
pub mod orders;
pub mod products;
pub mod social;
