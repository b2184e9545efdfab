//! Rating ledger
//!
//! Customers score their completed bookings once. The unique booking
//! constraint in the rating store settles concurrent attempts.

use hms_core::models::{BookingStatus, Rating, MAX_SCORE, MIN_SCORE};
use hms_core::policy::ensure_owner;
use hms_core::traits::{BookingRepository, RatingRepository};
use hms_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct NewRating {
    pub booking_id: i32,
    pub score: i16,
    pub comment: Option<String>,
}

pub struct RatingLedger<R: ?Sized, B: ?Sized> {
    ratings: Arc<R>,
    bookings: Arc<B>,
}

impl<R, B> RatingLedger<R, B>
where
    R: RatingRepository + ?Sized,
    B: BookingRepository + ?Sized,
{
    pub fn new(ratings: Arc<R>, bookings: Arc<B>) -> Self {
        Self { ratings, bookings }
    }

    /// Record the customer's rating of a completed booking
    #[instrument(skip(self))]
    pub async fn rate(&self, customer_id: i32, rating: NewRating) -> AppResult<Rating> {
        if !Rating::is_valid_score(rating.score) {
            return Err(AppError::Validation(format!(
                "score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }

        let booking = self
            .bookings
            .find_by_id(rating.booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;
        if booking.status != BookingStatus::Completed {
            return Err(AppError::InvalidBookingStatus);
        }
        ensure_owner(customer_id, booking.customer_id, "booking")?;
        if self.ratings.find_by_booking(booking.id).await?.is_some() {
            return Err(AppError::AlreadyRated);
        }

        let stored = self
            .ratings
            .create(&Rating {
                booking_id: booking.id,
                score: rating.score,
                comment: rating.comment,
                ..Default::default()
            })
            .await?;
        info!(booking_id = booking.id, score = stored.score, "Booking rated");
        Ok(stored)
    }

    /// Mean score over the service's ratings, 0.0 when unrated
    pub async fn average_for_service(&self, service_id: i32) -> AppResult<f64> {
        self.ratings.average_for_service(service_id).await
    }

    pub async fn has_customer_rated(&self, service_id: i32, customer_id: i32) -> AppResult<bool> {
        self.ratings.has_rated_completed(service_id, customer_id).await
    }
}
