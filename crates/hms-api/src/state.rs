//! Shared application state
//!
//! Every business service is built once at startup and shared by all
//! workers. Services hold their repositories as trait objects so the same
//! state type serves Postgres in production and in-memory stores in tests.

use hms_auth::{PasswordService, SessionManager};
use hms_core::traits::{BookingRepository, RatingRepository, ServiceRepository, UserRepository};
use hms_db::{
    PgBookingRepository, PgPool, PgRatingRepository, PgServiceRepository, PgUserRepository,
};
use hms_services::{BookingEngine, CatalogService, IdentityService, RatingLedger};
use std::sync::Arc;

pub type Identity = IdentityService<dyn UserRepository>;
pub type Catalog = CatalogService<dyn ServiceRepository, dyn RatingRepository>;
pub type Bookings = BookingEngine<dyn BookingRepository, dyn UserRepository, dyn ServiceRepository>;
pub type Ratings = RatingLedger<dyn RatingRepository, dyn BookingRepository>;

/// The stores the services run on
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub ratings: Arc<dyn RatingRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            services: Arc::new(PgServiceRepository::new(pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(pool.clone())),
            ratings: Arc::new(PgRatingRepository::new(pool.clone())),
        }
    }
}

pub struct AppState {
    pub identity: Identity,
    pub catalog: Catalog,
    pub bookings: Bookings,
    pub ratings: Ratings,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        sessions: Arc<SessionManager>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            identity: IdentityService::new(repos.users.clone(), passwords),
            catalog: CatalogService::new(repos.services.clone(), repos.ratings.clone()),
            bookings: BookingEngine::new(
                repos.bookings.clone(),
                repos.users,
                repos.services,
            ),
            ratings: RatingLedger::new(repos.ratings, repos.bookings),
            sessions,
        }
    }
}
