//! Business logic services for HMS
//!
//! This crate contains the engines that enforce the marketplace rules on
//! top of the repository traits from `hms-core`.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service is generic over the repositories it needs
//! - Services are wrapped in Arc for safe sharing across workers
//! - All operations are instrumented with tracing
//! - Store-level guards (unique constraints, conditional updates) are the
//!   authority; pre-checks in the services only pick the right error early
//!
//! # Services
//!
//! - `IdentityService` - Accounts, credentials, profiles and activation
//! - `CatalogService` - Service catalog with rating averages
//! - `BookingEngine` - Booking lifecycle state machine and listings
//! - `RatingLedger` - One rating per completed booking, service averages

pub mod booking;
pub mod catalog;
pub mod identity;
pub mod rating;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use booking::{BookingEngine, NewBooking};
pub use catalog::{CatalogService, NewService};
pub use identity::{IdentityService, NewAccount};
pub use rating::{NewRating, RatingLedger};
