//! Booking model and lifecycle state machine
//!
//! A booking moves through a small closed set of states:
//!
//! ```text
//! PENDING ──accept──▶ ACCEPTED ──finish──▶ COMPLETED
//!    │
//!    └────cancel────▶ CANCELLED
//! ```
//!
//! COMPLETED and CANCELLED are terminal.

use crate::models::user::UserRole;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    /// Waiting for an employee to claim it
    #[default]
    Pending,
    /// Claimed by exactly one employee
    Accepted,
    /// Work done; the customer may rate it
    Completed,
    /// Withdrawn by the customer before acceptance
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Accepted,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "ACCEPTED" => Some(BookingStatus::Accepted),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Accepted => "ACCEPTED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    /// The transition table. Anything not listed here is illegal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Accepted) | (Pending, Cancelled) | (Accepted, Completed) => true,
            (Pending, Pending | Completed)
            | (Accepted, Pending | Accepted | Cancelled)
            | (Completed, _)
            | (Cancelled, _) => false,
        }
    }

    /// No transition leaves this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i32,

    /// Booked service
    pub service_id: i32,

    /// Owning customer
    pub customer_id: i32,

    /// Employee bound on acceptance
    pub employee_id: Option<i32>,

    /// When the customer wants the work done
    pub hire_at: DateTime<Utc>,

    /// Where the work takes place
    pub address: String,

    /// Optional instructions from the customer
    pub note: Option<String>,

    /// Lifecycle state
    pub status: BookingStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_owned_by(&self, customer_id: i32) -> bool {
        self.customer_id == customer_id
    }

    pub fn is_bound_to(&self, employee_id: i32) -> bool {
        self.employee_id == Some(employee_id)
    }
}

impl Default for Booking {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            service_id: 0,
            customer_id: 0,
            employee_id: None,
            hire_at: now,
            address: String::new(),
            note: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Which bookings a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// Every booking
    All,
    /// Bookings owned by this customer
    OwnedBy(i32),
    /// Bookings bound to this employee plus every unclaimed booking
    ClaimableBy(i32),
}

impl BookingScope {
    /// Derive the visibility scope from the caller's identity
    pub fn for_caller(role: UserRole, user_id: i32) -> Self {
        match role {
            UserRole::Admin => BookingScope::All,
            UserRole::Customer => BookingScope::OwnedBy(user_id),
            UserRole::Employee => BookingScope::ClaimableBy(user_id),
        }
    }

    pub fn permits(&self, booking: &Booking) -> bool {
        match self {
            BookingScope::All => true,
            BookingScope::OwnedBy(customer_id) => booking.is_owned_by(*customer_id),
            BookingScope::ClaimableBy(employee_id) => {
                booking.is_bound_to(*employee_id) || booking.status == BookingStatus::Pending
            }
        }
    }
}

/// Column matched by the booking list keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingSearchField {
    ServiceName,
    CustomerName,
    EmployeeName,
    #[default]
    Any,
}

impl BookingSearchField {
    /// Map the numeric `field` query parameter (1 service, 2 customer, 3 employee)
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => Self::ServiceName,
            Some(2) => Self::CustomerName,
            Some(3) => Self::EmployeeName,
            _ => Self::Any,
        }
    }

    /// Column selector understood by the SQL layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServiceName => "service",
            Self::CustomerName => "customer",
            Self::EmployeeName => "employee",
            Self::Any => "any",
        }
    }
}

/// Booking list criteria
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub keyword: Option<String>,
    pub field: BookingSearchField,
}

impl BookingFilter {
    /// In-memory equivalent of the keyword predicate
    pub fn matches(&self, details: &BookingDetails) -> bool {
        let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) else {
            return true;
        };
        let needle = keyword.to_lowercase();
        let hit = |value: &str| value.to_lowercase().contains(&needle);
        let employee = details.employee_name.as_deref().is_some_and(hit);

        match self.field {
            BookingSearchField::ServiceName => hit(details.service_name.as_str()),
            BookingSearchField::CustomerName => hit(details.customer_name.as_str()),
            BookingSearchField::EmployeeName => employee,
            BookingSearchField::Any => {
                hit(details.service_name.as_str())
                    || hit(details.customer_name.as_str())
                    || employee
            }
        }
    }
}

/// Booking joined with the names shown in listings
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub booking: Booking,
    pub service_name: String,
    pub service_price: Decimal,
    pub customer_name: String,
    pub employee_name: Option<String>,
    /// A rating exists for this booking
    pub has_rated: bool,
}
