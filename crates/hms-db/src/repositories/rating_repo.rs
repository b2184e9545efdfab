//! Rating repository implementation
//!
//! One rating per booking is enforced by the `ratings_booking_id_key`
//! unique constraint.

use super::violated_constraint;
use chrono::{DateTime, Utc};
use hms_core::{models::Rating, traits::RatingRepository, AppError, AppResult};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument, warn};

/// PostgreSQL implementation of RatingRepository
pub struct PgRatingRepository {
    pool: PgPool,
}

impl PgRatingRepository {
    /// Create a new rating repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    #[instrument(skip(self))]
    async fn find_by_booking(&self, booking_id: i32) -> AppResult<Option<Rating>> {
        debug!("Finding rating for booking: {}", booking_id);

        let result = sqlx::query_as::<sqlx::Postgres, RatingRow>(
            r#"
            SELECT id, booking_id, score, comment, created_at
            FROM ratings
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding rating for booking {}: {}", booking_id, e);
            AppError::Database(format!("Failed to find rating: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self, rating))]
    async fn create(&self, rating: &Rating) -> AppResult<Rating> {
        debug!("Rating booking {} with {}", rating.booking_id, rating.score);

        let row = sqlx::query_as::<sqlx::Postgres, RatingRow>(
            r#"
            INSERT INTO ratings (booking_id, score, comment)
            VALUES ($1, $2, $3)
            RETURNING id, booking_id, score, comment, created_at
            "#,
        )
        .bind(rating.booking_id)
        .bind(rating.score)
        .bind(&rating.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("ratings_booking_id_key") {
                warn!("Booking {} already rated", rating.booking_id);
                AppError::AlreadyRated
            } else {
                error!("Database error creating rating: {}", e);
                AppError::Database(format!("Failed to create rating: {}", e))
            }
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn average_for_service(&self, service_id: i32) -> AppResult<f64> {
        let result: (Option<f64>,) = sqlx::query_as(
            r#"
            SELECT AVG(r.score)::FLOAT8
            FROM ratings r
            JOIN bookings b ON b.id = r.booking_id
            WHERE b.service_id = $1
            "#,
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error averaging ratings for service {}: {}", service_id, e);
            AppError::Database(format!("Failed to compute average rating: {}", e))
        })?;

        Ok(result.0.unwrap_or(0.0))
    }

    #[instrument(skip(self))]
    async fn has_rated_completed(&self, service_id: i32, customer_id: i32) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM bookings b
                JOIN ratings r ON r.booking_id = b.id
                WHERE b.service_id = $1
                  AND b.customer_id = $2
                  AND b.status = 'COMPLETED'
            )
            "#,
        )
        .bind(service_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error checking ratings: {}", e);
            AppError::Database(format!("Failed to check rating: {}", e))
        })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: i32,
    booking_id: i32,
    score: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            score: row.score,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{test_db, PgBookingRepository};
    use hms_core::models::UserRole;
    use hms_core::traits::BookingRepository;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_second_rating_is_already_rated() {
        let pool = test_db::pool().await;
        let repo = PgRatingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let service = test_db::service(&pool, "Door lock replacement").await;
        let booking = test_db::booking(&pool, service.id, customer.id).await;

        let rating = Rating {
            booking_id: booking.id,
            score: 4,
            comment: Some("Quick and tidy".to_string()),
            ..Default::default()
        };
        let stored = repo.create(&rating).await.unwrap();
        assert_eq!(stored.score, 4);

        let err = repo
            .create(&Rating { score: 1, ..rating })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyRated));

        let kept = repo.find_by_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(kept.id, stored.id);
        assert_eq!(kept.score, 4);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_average_and_has_rated() {
        let pool = test_db::pool().await;
        let repo = PgRatingRepository::new(pool.clone());
        let bookings = PgBookingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let other = test_db::user(&pool, UserRole::Customer).await;
        let employee = test_db::user(&pool, UserRole::Employee).await;
        let service = test_db::service(&pool, "Washing machine repair").await;

        assert_eq!(repo.average_for_service(service.id).await.unwrap(), 0.0);
        assert!(!repo.has_rated_completed(service.id, customer.id).await.unwrap());

        let done = test_db::booking(&pool, service.id, customer.id).await;
        assert!(bookings.claim(done.id, employee.id).await.unwrap());
        assert!(bookings.complete(done.id, employee.id).await.unwrap());
        let open = test_db::booking(&pool, service.id, customer.id).await;

        for (booking_id, score) in [(done.id, 4), (open.id, 5)] {
            repo.create(&Rating {
                booking_id,
                score,
                ..Default::default()
            })
            .await
            .unwrap();
        }

        assert_eq!(repo.average_for_service(service.id).await.unwrap(), 4.5);
        assert!(repo.has_rated_completed(service.id, customer.id).await.unwrap());
        assert!(!repo.has_rated_completed(service.id, other.id).await.unwrap());
    }
}
