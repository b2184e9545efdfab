//! Booking lifecycle engine
//!
//! PENDING -> ACCEPTED -> COMPLETED, or PENDING -> CANCELLED. Every state
//! change goes through a guarded update in the repository; the reads
//! before it only pick the error to report.

use chrono::{DateTime, Utc};
use hms_core::models::{
    Booking, BookingDetails, BookingFilter, BookingScope, BookingStatus, UserRole,
};
use hms_core::policy::ensure_owner;
use hms_core::traits::{BookingRepository, Page, Pagination, ServiceRepository, UserRepository};
use hms_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A customer's order
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub service_id: i32,
    pub hire_at: DateTime<Utc>,
    pub address: String,
    pub note: Option<String>,
}

pub struct BookingEngine<B: ?Sized, U: ?Sized, S: ?Sized> {
    bookings: Arc<B>,
    users: Arc<U>,
    services: Arc<S>,
}

impl<B, U, S> BookingEngine<B, U, S>
where
    B: BookingRepository + ?Sized,
    U: UserRepository + ?Sized,
    S: ServiceRepository + ?Sized,
{
    pub fn new(bookings: Arc<B>, users: Arc<U>, services: Arc<S>) -> Self {
        Self {
            bookings,
            users,
            services,
        }
    }

    /// Place a PENDING booking for an available service
    #[instrument(skip(self))]
    pub async fn order(&self, customer_id: i32, order: NewBooking) -> AppResult<Booking> {
        if order.address.trim().is_empty() {
            return Err(AppError::Validation("address must not be blank".to_string()));
        }
        if order.hire_at <= Utc::now() {
            return Err(AppError::Validation("hireAt must be in the future".to_string()));
        }

        let service = self
            .services
            .find_available(order.service_id)
            .await?
            .ok_or(AppError::ServiceNotFound)?;

        let booking = Booking {
            service_id: service.id,
            customer_id,
            employee_id: None,
            hire_at: order.hire_at,
            address: order.address,
            note: order.note,
            status: BookingStatus::Pending,
            ..Default::default()
        };
        let booking = self.bookings.create(&booking).await?;
        info!(booking_id = booking.id, customer_id, "Booking ordered");
        Ok(booking)
    }

    /// Claim a PENDING booking for the calling employee
    #[instrument(skip(self))]
    pub async fn accept(&self, employee_id: i32, booking_id: i32) -> AppResult<()> {
        self.ensure_active(employee_id).await?;
        let booking = self.find(booking_id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidBookingStatus);
        }
        if !self.bookings.claim(booking_id, employee_id).await? {
            warn!(booking_id, employee_id, "Booking claimed concurrently");
            return Err(AppError::InvalidBookingStatus);
        }

        info!(booking_id, employee_id, "Booking accepted");
        Ok(())
    }

    /// Complete an ACCEPTED booking bound to the calling employee
    #[instrument(skip(self))]
    pub async fn finish(&self, employee_id: i32, booking_id: i32) -> AppResult<()> {
        self.ensure_active(employee_id).await?;
        let booking = self.find(booking_id).await?;

        if !booking.is_bound_to(employee_id) {
            return Err(AppError::forbidden("booking is bound to another employee"));
        }
        if booking.status != BookingStatus::Accepted
            || !self.bookings.complete(booking_id, employee_id).await?
        {
            return Err(AppError::InvalidBookingStatus);
        }

        info!(booking_id, employee_id, "Booking finished");
        Ok(())
    }

    /// Cancel one of the caller's PENDING bookings
    #[instrument(skip(self))]
    pub async fn cancel(&self, customer_id: i32, booking_id: i32) -> AppResult<()> {
        let booking = self.find(booking_id).await?;
        ensure_owner(customer_id, booking.customer_id, "booking")?;

        if booking.status != BookingStatus::Pending
            || !self.bookings.cancel(booking_id, customer_id).await?
        {
            return Err(AppError::CannotCancel);
        }

        info!(booking_id, customer_id, "Booking cancelled");
        Ok(())
    }

    /// Bookings visible to the caller, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        caller_id: i32,
        role: UserRole,
        filter: &BookingFilter,
        pagination: Pagination,
    ) -> AppResult<Page<BookingDetails>> {
        let scope = BookingScope::for_caller(role, caller_id);
        let (items, total) = self
            .bookings
            .list(scope, filter, pagination.limit(), pagination.offset())
            .await?;
        debug!(total, ?scope, "Bookings listed");

        Ok(Page::new(items, total, pagination).map(normalize_rated))
    }

    /// One booking, if the caller may see it
    pub async fn get(&self, caller_id: i32, role: UserRole, booking_id: i32) -> AppResult<BookingDetails> {
        let details = self
            .bookings
            .find_details(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if !BookingScope::for_caller(role, caller_id).permits(&details.booking) {
            return Err(AppError::forbidden("booking is not visible to the caller"));
        }
        Ok(normalize_rated(details))
    }

    async fn find(&self, booking_id: i32) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)
    }

    async fn ensure_active(&self, user_id: i32) -> AppResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.active => Ok(()),
            _ => Err(AppError::AccountNotActive),
        }
    }
}

/// Only a completed booking reports its rating
fn normalize_rated(mut details: BookingDetails) -> BookingDetails {
    details.has_rated = details.has_rated && details.booking.status == BookingStatus::Completed;
    details
}
