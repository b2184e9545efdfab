//! Booking handlers

use crate::dto::booking::{BookingResponse, OrderBookingRequest};
use crate::dto::{ApiResponse, SearchQuery};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use hms_auth::AuthenticatedUser;
use hms_core::models::{BookingFilter, BookingSearchField};
use hms_core::policy::Operation;
use hms_core::AppError;
use tracing::{debug, instrument};
use validator::Validate;

/// Order a service
///
/// POST /api/v1/bookings
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn order_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<OrderBookingRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::OrderBooking)?;
    req.validate()?;

    let booking = state
        .bookings
        .order(user.user_id, req.into_inner().into())
        .await?;
    debug!(booking_id = booking.id, "Booking created");

    Ok(HttpResponse::Ok().json(ApiResponse::success("Order booking successfully")))
}

/// List bookings visible to the caller
///
/// GET /api/v1/bookings
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn list_bookings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ListBookings)?;
    query.validate()?;

    let filter = BookingFilter {
        keyword: query.keyword(),
        field: BookingSearchField::from_code(query.field),
    };
    let page = state
        .bookings
        .list(user.user_id, user.role, &filter, query.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(page.map(BookingResponse::from))))
}

/// Get one booking
///
/// GET /api/v1/bookings/{id}
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn get_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ViewBooking)?;

    let details = state
        .bookings
        .get(user.user_id, user.role, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(BookingResponse::from(details))))
}

/// Accept a pending booking
///
/// PATCH /api/v1/bookings/{id}/accept
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn accept_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::AcceptBooking)?;
    state.bookings.accept(user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Accept Booking successfully")))
}

/// Finish an accepted booking
///
/// PATCH /api/v1/bookings/{id}/finish
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn finish_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::FinishBooking)?;
    state.bookings.finish(user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Finish Booking successfully")))
}

/// Cancel a pending booking
///
/// PATCH /api/v1/bookings/{id}/cancel
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn cancel_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::CancelBooking)?;
    state.bookings.cancel(user.user_id, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Cancel Booking successfully")))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(order_booking))
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}/accept", web::patch().to(accept_booking))
            .route("/{id}/finish", web::patch().to(finish_booking))
            .route("/{id}/cancel", web::patch().to(cancel_booking)),
    );
}
