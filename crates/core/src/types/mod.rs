//! Core types for Orchard.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod group;
pub mod id;
pub mod order_code;
pub mod phone;
pub mod price;

pub use email::{Email, EmailError};
pub use group::{Group, GroupError};
pub use id::*;
pub use order_code::OrderCode;
pub use phone::{Phone, PhoneError};
pub use price::{Price, PriceError};
