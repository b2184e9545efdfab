//! Booking DTOs

use chrono::{DateTime, Utc};
use hms_core::models::{BookingDetails, BookingStatus};
use hms_services::NewBooking;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order a service
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookingRequest {
    pub service_id: i32,

    /// When the work should happen; must be in the future
    pub hire_at: DateTime<Utc>,

    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,

    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

impl From<OrderBookingRequest> for NewBooking {
    fn from(req: OrderBookingRequest) -> Self {
        Self {
            service_id: req.service_id,
            hire_at: req.hire_at,
            address: req.address,
            note: req.note,
        }
    }
}

/// A booking as shown in listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i32,
    pub service_id: i32,
    pub service_name: String,
    pub customer_id: i32,
    pub customer_name: String,
    pub employee_id: Option<i32>,
    pub employee_name: Option<String>,
    pub hire_at: DateTime<Utc>,
    pub address: String,
    pub note: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub status: BookingStatus,
    pub has_rated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<BookingDetails> for BookingResponse {
    fn from(details: BookingDetails) -> Self {
        let booking = details.booking;
        Self {
            id: booking.id,
            service_id: booking.service_id,
            service_name: details.service_name,
            customer_id: booking.customer_id,
            customer_name: details.customer_name,
            employee_id: booking.employee_id,
            employee_name: details.employee_name,
            hire_at: booking.hire_at,
            address: booking.address,
            note: booking.note,
            price: details.service_price,
            status: booking.status,
            has_rated: details.has_rated,
            created_at: booking.created_at,
        }
    }
}
