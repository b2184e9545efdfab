//! API layer for HMS
//!
//! HTTP handlers for accounts, the service catalog, bookings and ratings,
//! plus the shared state and error recovery the server wires around them.

#![forbid(unsafe_code)]

pub mod dto;
pub mod errors;
pub mod handlers;
pub mod state;

use actix_web::web;

pub use dto::ApiResponse;
pub use state::{AppState, Repositories};

/// Mount all routes under `/api/v1`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(handlers::configure));
}
