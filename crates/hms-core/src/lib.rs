//! HMS Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the HMS home service marketplace. It includes:
//!
//! - Domain models (User, Service, Booking, Rating, RevokedToken)
//! - Repository traits implemented by the database layer
//! - The access policy (role x operation rule table)
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
