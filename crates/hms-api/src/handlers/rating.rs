//! Rating handlers

use crate::dto::rating::{RatingCheckQuery, RatingCheckResponse, RatingRequest, RatingResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use hms_auth::AuthenticatedUser;
use hms_core::policy::{ensure_owner, Operation};
use hms_core::AppError;
use tracing::instrument;
use validator::Validate;

/// Rate a completed booking
///
/// POST /api/v1/rating
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn create_rating(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<RatingRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::RateBooking)?;
    req.validate()?;

    let rating = state
        .ratings
        .rate(user.user_id, req.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        RatingResponse::from(rating),
        "Create Rating successfully",
    )))
}

/// Has the customer rated a completed booking of the service
///
/// GET /api/v1/rating/check
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn check_rating(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<RatingCheckQuery>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::CheckRating)?;

    let customer_id = query.customer_id.unwrap_or(user.user_id);
    ensure_owner(user.user_id, customer_id, "rating history")?;

    let has_rated = state
        .ratings
        .has_customer_rated(query.service_id, customer_id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(RatingCheckResponse { has_rated })))
}

/// Configure rating routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rating")
            .route("", web::post().to(create_rating))
            .route("/check", web::get().to(check_rating)),
    );
}
