//! Booking repository implementation
//!
//! Every state change is a single guarded `UPDATE`: the `WHERE` clause
//! carries the expected current status (and owner), so of two concurrent
//! requests at most one sees a row affected.

use super::contains_pattern;
use chrono::{DateTime, Utc};
use hms_core::{
    models::{Booking, BookingDetails, BookingFilter, BookingScope, BookingStatus},
    traits::BookingRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

const BOOKING_COLUMNS: &str = r#"
    id, service_id, customer_id, employee_id, hire_at, address, note,
    status, created_at, updated_at
"#;

const DETAILS_SELECT: &str = r#"
    SELECT
        b.id, b.service_id, b.customer_id, b.employee_id, b.hire_at,
        b.address, b.note, b.status, b.created_at, b.updated_at,
        s.name AS service_name,
        s.price AS service_price,
        c.full_name AS customer_name,
        e.full_name AS employee_name,
        EXISTS (SELECT 1 FROM ratings r WHERE r.booking_id = b.id) AS has_rated
    FROM bookings b
    JOIN services s ON s.id = b.service_id
    JOIN users c ON c.id = b.customer_id
    LEFT JOIN users e ON e.id = b.employee_id
"#;

/// Visibility and keyword predicate shared by the page and count queries.
///
/// $1 scope kind, $2 caller id, $3 keyword, $4 keyword field.
const LIST_WHERE: &str = r#"
    WHERE ($1::TEXT = 'all'
           OR ($1::TEXT = 'customer' AND b.customer_id = $2)
           OR ($1::TEXT = 'employee' AND (b.employee_id = $2 OR b.status = 'PENDING')))
      AND ($3::TEXT IS NULL
           OR ($4::TEXT = 'service' AND s.name ILIKE $3 ESCAPE '\')
           OR ($4::TEXT = 'customer' AND c.full_name ILIKE $3 ESCAPE '\')
           OR ($4::TEXT = 'employee' AND e.full_name ILIKE $3 ESCAPE '\')
           OR ($4::TEXT = 'any' AND (s.name ILIKE $3 ESCAPE '\'
                                     OR c.full_name ILIKE $3 ESCAPE '\'
                                     OR e.full_name ILIKE $3 ESCAPE '\')))
"#;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert database status string to enum
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or(BookingStatus::Pending)
    }

    /// Bind values for the scope part of [`LIST_WHERE`]
    fn scope_params(scope: BookingScope) -> (&'static str, i32) {
        match scope {
            BookingScope::All => ("all", 0),
            BookingScope::OwnedBy(customer_id) => ("customer", customer_id),
            BookingScope::ClaimableBy(employee_id) => ("employee", employee_id),
        }
    }

    /// Run a guarded status change, reporting whether a row matched
    async fn transition(
        &self,
        sql: &str,
        id: i32,
        actor_id: i32,
        action: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(sql)
            .bind(id)
            .bind(actor_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error trying to {} booking {}: {}", action, id, e);
                AppError::Database(format!("Failed to {} booking: {}", action, e))
            })?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self, booking))]
    async fn create(&self, booking: &Booking) -> AppResult<Booking> {
        debug!(
            "Creating booking of service {} for customer {}",
            booking.service_id, booking.customer_id
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (service_id, customer_id, hire_at, address, note, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.service_id)
        .bind(booking.customer_id)
        .bind(booking.hire_at)
        .bind(&booking.address)
        .bind(&booking.note)
        .bind(BookingStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating booking: {}", e);
            AppError::Database(format!("Failed to create booking: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn claim(&self, id: i32, employee_id: i32) -> AppResult<bool> {
        debug!("Employee {} claiming booking {}", employee_id, id);

        self.transition(
            r#"
            UPDATE bookings
            SET status = 'ACCEPTED',
                employee_id = $2,
                updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
            id,
            employee_id,
            "claim",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn complete(&self, id: i32, employee_id: i32) -> AppResult<bool> {
        debug!("Employee {} completing booking {}", employee_id, id);

        self.transition(
            r#"
            UPDATE bookings
            SET status = 'COMPLETED',
                updated_at = NOW()
            WHERE id = $1 AND status = 'ACCEPTED' AND employee_id = $2
            "#,
            id,
            employee_id,
            "complete",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cancel(&self, id: i32, customer_id: i32) -> AppResult<bool> {
        debug!("Customer {} cancelling booking {}", customer_id, id);

        self.transition(
            r#"
            UPDATE bookings
            SET status = 'CANCELLED',
                updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING' AND customer_id = $2
            "#,
            id,
            customer_id,
            "cancel",
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_details(&self, id: i32) -> AppResult<Option<BookingDetails>> {
        debug!("Finding booking details: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, BookingDetailsRow>(&format!(
            "{} WHERE b.id = $1",
            DETAILS_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding booking details {}: {}", id, e);
            AppError::Database(format!("Failed to find booking: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        scope: BookingScope,
        filter: &BookingFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookingDetails>, i64)> {
        debug!("Listing bookings in scope {:?}", scope);

        let (scope_kind, caller_id) = Self::scope_params(scope);
        let keyword = contains_pattern(filter.keyword.as_deref());

        let total: (i64,) = sqlx::query_as(&format!(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN services s ON s.id = b.service_id
            JOIN users c ON c.id = b.customer_id
            LEFT JOIN users e ON e.id = b.employee_id
            {}
            "#,
            LIST_WHERE
        ))
        .bind(scope_kind)
        .bind(caller_id)
        .bind(keyword.as_deref())
        .bind(filter.field.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        let rows = sqlx::query_as::<sqlx::Postgres, BookingDetailsRow>(&format!(
            "{} {} ORDER BY b.created_at DESC, b.id DESC LIMIT $5 OFFSET $6",
            DETAILS_SELECT, LIST_WHERE
        ))
        .bind(scope_kind)
        .bind(caller_id)
        .bind(keyword.as_deref())
        .bind(filter.field.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing bookings: {}", e);
            AppError::Database(format!("Failed to fetch bookings: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: i32,
    service_id: i32,
    customer_id: i32,
    employee_id: Option<i32>,
    hire_at: DateTime<Utc>,
    address: String,
    note: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            service_id: row.service_id,
            customer_id: row.customer_id,
            employee_id: row.employee_id,
            hire_at: row.hire_at,
            address: row.address,
            note: row.note,
            status: PgBookingRepository::parse_status(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingDetailsRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    service_name: String,
    service_price: Decimal,
    customer_name: String,
    employee_name: Option<String>,
    has_rated: bool,
}

impl From<BookingDetailsRow> for BookingDetails {
    fn from(row: BookingDetailsRow) -> Self {
        Self {
            booking: row.booking.into(),
            service_name: row.service_name,
            service_price: row.service_price,
            customer_name: row.customer_name,
            employee_name: row.employee_name,
            has_rated: row.has_rated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_db;
    use hms_core::models::{BookingSearchField, UserRole};

    #[test]
    fn test_parse_status() {
        assert_eq!(
            PgBookingRepository::parse_status("ACCEPTED"),
            BookingStatus::Accepted
        );
        assert_eq!(
            PgBookingRepository::parse_status("CANCELLED"),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn test_scope_params() {
        assert_eq!(PgBookingRepository::scope_params(BookingScope::All).0, "all");
        assert_eq!(
            PgBookingRepository::scope_params(BookingScope::OwnedBy(4)),
            ("customer", 4)
        );
        assert_eq!(
            PgBookingRepository::scope_params(BookingScope::ClaimableBy(9)),
            ("employee", 9)
        );
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_concurrent_claims_have_one_winner() {
        let pool = test_db::pool().await;
        let repo = PgBookingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let first = test_db::user(&pool, UserRole::Employee).await;
        let second = test_db::user(&pool, UserRole::Employee).await;
        let service = test_db::service(&pool, "Pipe repair").await;
        let booking = test_db::booking(&pool, service.id, customer.id).await;

        let (a, b) = tokio::join!(
            repo.claim(booking.id, first.id),
            repo.claim(booking.id, second.id)
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(a ^ b, "exactly one claim must succeed");

        let stored = repo.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Accepted);
        let winner = if a { first.id } else { second.id };
        assert_eq!(stored.employee_id, Some(winner));

        // a third attempt finds nothing to claim
        assert!(!repo.claim(booking.id, first.id).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_complete_and_cancel_are_guarded() {
        let pool = test_db::pool().await;
        let repo = PgBookingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let stranger = test_db::user(&pool, UserRole::Customer).await;
        let employee = test_db::user(&pool, UserRole::Employee).await;
        let other_employee = test_db::user(&pool, UserRole::Employee).await;
        let service = test_db::service(&pool, "Air conditioner cleaning").await;

        let booking = test_db::booking(&pool, service.id, customer.id).await;
        assert!(!repo.complete(booking.id, employee.id).await.unwrap());
        assert!(repo.claim(booking.id, employee.id).await.unwrap());
        assert!(!repo.complete(booking.id, other_employee.id).await.unwrap());
        assert!(repo.complete(booking.id, employee.id).await.unwrap());
        assert!(!repo.cancel(booking.id, customer.id).await.unwrap());

        let pending = test_db::booking(&pool, service.id, customer.id).await;
        assert!(!repo.cancel(pending.id, stranger.id).await.unwrap());
        assert!(repo.cancel(pending.id, customer.id).await.unwrap());
        assert!(!repo.claim(pending.id, employee.id).await.unwrap());

        let stored = repo.find_by_id(pending.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.employee_id, None);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_list_totals_count_visible_rows_only() {
        let pool = test_db::pool().await;
        let repo = PgBookingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let first = test_db::user(&pool, UserRole::Employee).await;
        let second = test_db::user(&pool, UserRole::Employee).await;
        let tag = test_db::unique();
        let service = test_db::service(&pool, &format!("Roof check {}", tag)).await;

        test_db::booking(&pool, service.id, customer.id).await;
        let mine = test_db::booking(&pool, service.id, customer.id).await;
        let theirs = test_db::booking(&pool, service.id, customer.id).await;
        assert!(repo.claim(mine.id, first.id).await.unwrap());
        assert!(repo.claim(theirs.id, second.id).await.unwrap());

        let filter = BookingFilter {
            keyword: Some(tag),
            field: BookingSearchField::ServiceName,
        };

        let (items, total) = repo
            .list(BookingScope::ClaimableBy(first.id), &filter, 1, 0)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.len(), 1);

        let (items, total) = repo
            .list(BookingScope::ClaimableBy(first.id), &filter, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(items.iter().all(|d| d.booking.id != theirs.id));

        let (_, total) = repo
            .list(BookingScope::OwnedBy(customer.id), &filter, 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 3);

        let (_, total) = repo.list(BookingScope::All, &filter, 10, 0).await.unwrap();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_keyword_wildcards_match_literally() {
        let pool = test_db::pool().await;
        let repo = PgBookingRepository::new(pool.clone());
        let customer = test_db::user(&pool, UserRole::Customer).await;
        let tag = test_db::unique();
        let service = test_db::service(&pool, &format!("Paint {}x", tag)).await;
        test_db::booking(&pool, service.id, customer.id).await;

        let filter = |keyword: String| BookingFilter {
            keyword: Some(keyword),
            field: BookingSearchField::ServiceName,
        };

        let (_, total) = repo
            .list(BookingScope::All, &filter(format!("{}x", tag)), 10, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);

        for wildcard in ["_", "%"] {
            let (_, total) = repo
                .list(BookingScope::All, &filter(format!("{}{}", tag, wildcard)), 10, 0)
                .await
                .unwrap();
            assert_eq!(total, 0, "{wildcard} must match literally");
        }
    }
}
