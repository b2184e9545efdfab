//! User model
//!
//! Represents marketplace accounts: customers, employees and administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Books services and rates completed work
    #[default]
    Customer,
    /// Manages the catalog and employee accounts
    Admin,
    /// Accepts and fulfills bookings
    Employee,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl UserRole {
    /// All roles, in declaration order
    pub const ALL: [UserRole; 3] = [UserRole::Customer, UserRole::Admin, UserRole::Employee];

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CUSTOMER" => Some(UserRole::Customer),
            "ADMIN" => Some(UserRole::Admin),
            "EMPLOYEE" => Some(UserRole::Employee),
            _ => None,
        }
    }

    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::Admin => "ADMIN",
            UserRole::Employee => "EMPLOYEE",
        }
    }

    /// Check if role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i32,

    /// Display name
    pub full_name: String,

    /// Email address (unique, used for login)
    pub email: String,

    /// Phone number (unique)
    pub phone_number: String,

    /// Password hash (never expose in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// User role
    pub role: UserRole,

    /// Whether the account may log in and act
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if user is active and can login
    pub fn can_login(&self) -> bool {
        self.active
    }

    /// Check if user can perform admin actions
    pub fn can_admin(&self) -> bool {
        self.active && self.role.is_admin()
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            full_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            password_hash: String::new(),
            role: UserRole::Customer,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form of an email address
///
/// Emails are unique regardless of letter case, so every lookup and write
/// goes through this.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    /// Apply the update to a user in place
    pub fn apply_to(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone_number {
            user.phone_number = phone.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone_number.is_none()
    }
}

/// Column matched by the employee listing keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmployeeSearchField {
    FullName,
    Email,
    Phone,
    #[default]
    Any,
}

impl EmployeeSearchField {
    /// Map the numeric `field` query parameter (1 name, 2 email, 3 phone)
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(1) => Self::FullName,
            Some(2) => Self::Email,
            Some(3) => Self::Phone,
            _ => Self::Any,
        }
    }

    /// Column selector understood by the SQL layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Any => "any",
        }
    }

    /// Does a user match the keyword on this field
    pub fn matches(&self, user: &User, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        let hit = |value: &str| value.to_lowercase().contains(&needle);
        match self {
            Self::FullName => hit(user.full_name.as_str()),
            Self::Email => hit(user.email.as_str()),
            Self::Phone => hit(user.phone_number.as_str()),
            Self::Any => {
                hit(user.full_name.as_str())
                    || hit(user.email.as_str())
                    || hit(user.phone_number.as_str())
            }
        }
    }
}
