//! Domain models for HMS
//!
//! This module contains all the core domain models used throughout the application.

pub mod booking;
pub mod rating;
pub mod service;
pub mod token;
pub mod user;

pub use booking::{
    Booking, BookingDetails, BookingFilter, BookingScope, BookingSearchField, BookingStatus,
};
pub use rating::{average_score, Rating, MAX_SCORE, MIN_SCORE};
pub use service::{Service, ServiceFilter, ServiceSearchField, ServiceSummary, ServiceUpdate};
pub use token::RevokedToken;
pub use user::{normalize_email, EmployeeSearchField, ProfileUpdate, User, UserRole};
