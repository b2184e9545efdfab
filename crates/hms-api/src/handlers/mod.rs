//! HTTP request handlers

pub mod auth;
pub mod booking;
pub mod employee;
pub mod health;
pub mod rating;
pub mod service;

use actix_web::web;

pub use auth::configure as configure_auth;
pub use booking::configure as configure_bookings;
pub use employee::configure as configure_employees;
pub use health::configure as configure_health;
pub use rating::configure as configure_rating;
pub use service::configure as configure_services;

/// Mount every route group
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health)
        .configure(configure_auth)
        .configure(configure_bookings)
        .configure(configure_services)
        .configure(configure_rating)
        .configure(configure_employees);
}
