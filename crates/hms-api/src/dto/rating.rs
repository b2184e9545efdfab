//! Rating DTOs

use chrono::{DateTime, Utc};
use hms_core::models::Rating;
use hms_services::NewRating;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Rate a completed booking
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub booking_id: i32,

    #[serde(alias = "rate")]
    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: i16,

    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

impl From<RatingRequest> for NewRating {
    fn from(req: RatingRequest) -> Self {
        Self {
            booking_id: req.booking_id,
            score: req.score,
            comment: req.comment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: i32,
    pub booking_id: i32,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            booking_id: rating.booking_id,
            score: rating.score,
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

/// `GET /rating/check` parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingCheckQuery {
    pub service_id: i32,
    /// Defaults to the caller
    pub customer_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingCheckResponse {
    pub has_rated: bool,
}
