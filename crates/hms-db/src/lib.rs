//! HMS Database Layer
//!
//! This crate provides PostgreSQL database access and repository implementations
//! for the HMS marketplace. It includes:
//!
//! - Connection pool management with sqlx
//! - Embedded schema migrations
//! - Repository implementations for users, services, bookings, ratings and
//!   the token revocation set
//!
//! Uniqueness (email, phone number, one rating per booking) and booking state
//! transitions are enforced by constraints and guarded updates in the store,
//! so concurrent requests cannot break them.

pub mod pool;
pub mod repositories;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;

// Re-export commonly used types
pub use hms_core::{AppError, AppResult};
pub use sqlx::PgPool;
