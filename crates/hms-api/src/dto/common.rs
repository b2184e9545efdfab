//! Common DTOs used across the API

use hms_core::error::SUCCESS_CODE;
use hms_core::traits::Pagination;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Standard API response wrapper
///
/// `{"code": 1000, "result": ..., "message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Application code, always the success code
    pub code: u32,
    /// Response payload
    pub result: T,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with a payload
    pub fn success(result: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            result,
            message: None,
        }
    }

    /// Create a success response with a payload and message
    pub fn with_message(result: T, message: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            result,
            message: Some(message.into()),
        }
    }
}

/// Keyword search with pagination, shared by the booking and employee lists
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub keyword: Option<String>,

    /// Column selector, meaning depends on the listing
    pub field: Option<i32>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page_number: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: i64,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page_number, self.page_size)
    }

    /// Keyword with surrounding whitespace removed; blank means no filter
    pub fn keyword(&self) -> Option<String> {
        trimmed_keyword(self.keyword.as_deref())
    }
}

pub(crate) fn trimmed_keyword(keyword: Option<&str>) -> Option<String> {
    keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_page_size() -> i64 {
    Pagination::DEFAULT_PAGE_SIZE
}

/// Digits with an optional leading `+`, 9 to 15 digits long
pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
    }
}
