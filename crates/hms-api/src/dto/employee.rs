//! Employee management DTOs

use super::common::validate_phone;
use hms_core::models::UserRole;
use hms_services::NewAccount;
use serde::Deserialize;
use validator::Validate;

/// Admin-created employee account
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub fullname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
}

impl From<CreateEmployeeRequest> for NewAccount {
    fn from(req: CreateEmployeeRequest) -> Self {
        Self {
            full_name: req.fullname,
            email: req.email,
            password: req.password,
            phone_number: req.phone_number,
            role: UserRole::Employee,
        }
    }
}
