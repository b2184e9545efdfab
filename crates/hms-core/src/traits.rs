//! Common traits for repositories
//!
//! Defines the storage abstractions the business services are generic over.
//! Implementations must enforce the uniqueness and state-transition
//! guarantees documented on each method atomically in the store.

use crate::error::AppError;
use crate::models::{
    Booking, BookingDetails, BookingFilter, BookingScope, EmployeeSearchField, ProfileUpdate,
    Rating, RevokedToken, Service, ServiceFilter, User, UserRole,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generic repository trait for basic persistence
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;
}

/// User repository trait with specialized methods
///
/// Writes fail with `EmailExists` / `PhoneExists` when the store's
/// uniqueness constraints reject the row. Email comparison ignores case.
/// Role and active flag are never written back from a previously read
/// row; the active flag only changes through `toggle_active`.
#[async_trait]
pub trait UserRepository: Repository<User, i32> {
    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Set the given profile columns in place, returning the updated row
    async fn update_profile(
        &self,
        id: i32,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, AppError>;

    /// Replace the password hash; false if the user does not exist
    async fn set_password_hash(&self, id: i32, password_hash: &str) -> Result<bool, AppError>;

    /// Find user by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Flip the active flag in a single statement, returning the new state
    async fn toggle_active(&self, id: i32) -> Result<Option<User>, AppError>;

    /// List users of a role, optionally filtered by keyword
    async fn list_by_role(
        &self,
        role: UserRole,
        keyword: Option<&str>,
        field: EmployeeSearchField,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), AppError>;
}

/// Service catalog repository
#[async_trait]
pub trait ServiceRepository: Repository<Service, i32> {
    /// Find a service that has not been deleted
    async fn find_available(&self, id: i32) -> Result<Option<Service>, AppError>;

    /// Mark a service as deleted; false if absent or already deleted
    async fn soft_delete(&self, id: i32) -> Result<bool, AppError>;

    /// Search non-deleted services
    async fn search(
        &self,
        filter: &ServiceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Service>, i64), AppError>;
}

/// Booking repository
///
/// State changes are conditional updates: each returns `true` only when
/// exactly one row matched the guard, so concurrent callers cannot both win.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Booking>, AppError>;

    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;

    /// PENDING -> ACCEPTED, binding the employee
    async fn claim(&self, id: i32, employee_id: i32) -> Result<bool, AppError>;

    /// ACCEPTED -> COMPLETED, only for the bound employee
    async fn complete(&self, id: i32, employee_id: i32) -> Result<bool, AppError>;

    /// PENDING -> CANCELLED, only for the owning customer
    async fn cancel(&self, id: i32, customer_id: i32) -> Result<bool, AppError>;

    /// One booking with display names
    async fn find_details(&self, id: i32) -> Result<Option<BookingDetails>, AppError>;

    /// Page of bookings visible in `scope`; the total counts the same set
    async fn list(
        &self,
        scope: BookingScope,
        filter: &BookingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BookingDetails>, i64), AppError>;
}

/// Rating repository
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find_by_booking(&self, booking_id: i32) -> Result<Option<Rating>, AppError>;

    /// Insert a rating; fails with `AlreadyRated` if the booking has one
    async fn create(&self, rating: &Rating) -> Result<Rating, AppError>;

    /// Mean score over ratings of the service's bookings, 0.0 if none
    async fn average_for_service(&self, service_id: i32) -> Result<f64, AppError>;

    /// Any completed booking of the customer for the service has a rating
    async fn has_rated_completed(
        &self,
        service_id: i32,
        customer_id: i32,
    ) -> Result<bool, AppError>;
}

/// Token revocation set
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    /// Add an entry; revoking the same jti twice is not an error
    async fn revoke(&self, token: &RevokedToken) -> Result<(), AppError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError>;

    /// Drop entries whose token has expired, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip; saturates instead of overflowing on huge page numbers
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PAGE_SIZE)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, pagination: Pagination) -> Self {
        let total_pages = if pagination.page_size > 0 {
            (total_items + pagination.page_size - 1) / pagination.page_size
        } else {
            0
        };

        Self {
            items,
            total_items,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages,
        }
    }

    /// Convert the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000);
        assert_eq!(p.page_size, Pagination::MAX_PAGE_SIZE);

        let p = Pagination::new(1, 0);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn test_pagination_huge_page_does_not_overflow() {
        let p = Pagination::new(i64::MAX, Pagination::MAX_PAGE_SIZE);
        assert_eq!(p.offset(), i64::MAX);
        assert!(p.offset() >= 0);

        let page = Page::new(Vec::<i32>::new(), 3, p);
        assert_eq!(page.page, i64::MAX);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_page_total_pages() {
        let p = Pagination::new(1, 10);
        assert_eq!(Page::new(Vec::<i32>::new(), 95, p).total_pages, 10);
        assert_eq!(Page::new(Vec::<i32>::new(), 100, p).total_pages, 10);
        assert_eq!(Page::new(Vec::<i32>::new(), 101, p).total_pages, 11);
        assert_eq!(Page::new(Vec::<i32>::new(), 0, p).total_pages, 0);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let page = Page::new(vec![1, 2], 2, Pagination::new(1, 10)).map(|n| n * 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["items"], serde_json::json!([10, 20]));
        assert_eq!(json["totalItems"], 2);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalPages"], 1);
    }
}
