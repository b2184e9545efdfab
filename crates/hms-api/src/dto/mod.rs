//! Data Transfer Objects (DTOs) for API requests and responses
//!
//! Bodies and query strings use camelCase field names.

pub mod auth;
pub mod booking;
pub mod common;
pub mod employee;
pub mod rating;
pub mod service;

pub use auth::*;
pub use booking::*;
pub use common::*;
pub use employee::*;
pub use rating::*;
pub use service::*;
