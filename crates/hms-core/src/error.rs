//! Unified error handling for HMS
//!
//! Every failure in the application is an [`AppError`]. Each variant maps to
//! an HTTP status, a snake_case error code and a numeric application code
//! that clients already know from the marketplace frontend.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Numeric application code carried by successful responses
pub const SUCCESS_CODE: u32 = 1000;

/// Numeric application code for unexpected failures
pub const UNKNOWN_ERROR_CODE: u32 = 9999;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Authentication Errors ====================
    #[error("Password or username is wrong")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    // ==================== Identity Errors ====================
    #[error("Phone number has been existed")]
    PhoneExists,

    #[error("Email has been existed")]
    EmailExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Account not active")]
    AccountNotActive,

    // ==================== Catalog Errors ====================
    #[error("Price must be greater or equal to 0, below 10^12 and have at most 2 decimal places")]
    PriceInvalid,

    #[error("Service not found")]
    ServiceNotFound,

    // ==================== Booking Errors ====================
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Booking status invalid")]
    InvalidBookingStatus,

    #[error("Can only cancel pending bookings")]
    CannotCancel,

    #[error("Booking has already been rated")]
    AlreadyRated,

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ==================== Resource Errors ====================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::PriceInvalid => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            AppError::InvalidCredentials
            | AppError::InvalidToken(_)
            | AppError::TokenExpired
            | AppError::TokenRevoked
            | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden(_) | AppError::AccountNotActive => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::UserNotFound
            | AppError::ServiceNotFound
            | AppError::BookingNotFound
            | AppError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::PhoneExists
            | AppError::EmailExists
            | AppError::InvalidBookingStatus
            | AppError::CannotCancel
            | AppError::AlreadyRated
            | AppError::Conflict(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Transaction(_)
            | AppError::PasswordHash(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::TokenExpired => "token_expired",
            AppError::InvalidToken(_) => "invalid_token",
            AppError::TokenRevoked => "token_revoked",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::PasswordHash(_) => "password_error",
            AppError::PhoneExists => "phone_exists",
            AppError::EmailExists => "email_exists",
            AppError::UserNotFound => "user_not_found",
            AppError::AccountNotActive => "account_not_active",
            AppError::PriceInvalid => "price_invalid",
            AppError::ServiceNotFound => "service_not_found",
            AppError::BookingNotFound => "booking_not_found",
            AppError::InvalidBookingStatus => "invalid_booking_status",
            AppError::CannotCancel => "cannot_cancel",
            AppError::AlreadyRated => "already_rated",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Returns the numeric application code
    ///
    /// Domain failures keep the codes of the marketplace's published API
    /// (1001-1011); generic failures use 14xx mirroring their HTTP status.
    pub fn app_code(&self) -> u32 {
        match self {
            AppError::PhoneExists => 1001,
            AppError::InvalidCredentials => 1002,
            AppError::UserNotFound => 1003,
            AppError::EmailExists => 1004,
            AppError::PriceInvalid => 1005,
            AppError::ServiceNotFound => 1006,
            AppError::BookingNotFound => 1007,
            AppError::InvalidBookingStatus => 1008,
            AppError::AccountNotActive => 1009,
            AppError::CannotCancel => 1010,
            AppError::AlreadyRated => 1011,
            AppError::Validation(_) | AppError::InvalidInput(_) => 1400,
            AppError::Unauthorized(_)
            | AppError::InvalidToken(_)
            | AppError::TokenExpired
            | AppError::TokenRevoked => 1401,
            AppError::Forbidden(_) => 1403,
            AppError::NotFound(_) => 1404,
            AppError::Conflict(_) => 1409,
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Transaction(_)
            | AppError::PasswordHash(_)
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => UNKNOWN_ERROR_CODE,
        }
    }

    /// Shorthand for an ownership or role denial
    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "code": self.app_code(),
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
