//! Authentication DTOs
//!
//! Request and response types for authentication and profile endpoints.

use super::common::validate_phone;
use hms_core::models::{ProfileUpdate, User, UserRole};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token (JWT)
    pub token: String,

    /// Role of the logged in account
    pub role: UserRole,

    /// Token lifetime in seconds
    pub expires_in: i64,
}

/// Account registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub fullname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    /// CUSTOMER when absent; other roles need an admin caller
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Requested role, CUSTOMER when absent
    pub fn role(&self) -> Option<UserRole> {
        match self.role.as_deref() {
            None => Some(UserRole::Customer),
            Some(role) => UserRole::from_str(role),
        }
    }
}

/// Logout request; the bearer header is used when no token is given
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    pub token: Option<String>,
}

/// Partial profile update
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub fullname: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            full_name: req.fullname,
            email: req.email,
            phone_number: req.phone_number,
        }
    }
}

/// Change password request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub fullname: String,
    pub email: String,
    pub phone_number: String,
    pub role: UserRole,
    /// Active flag
    pub status: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.full_name,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            status: user.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid_req = LoginRequest {
            email: "an@gmail.com".to_string(),
            password: "123456".to_string(),
        };
        assert!(valid_req.validate().is_ok());

        let invalid_req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
        };
        let errors = invalid_req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_register_request_role() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "fullname": "Nguyen Van An",
            "email": "an@gmail.com",
            "password": "123456",
            "phoneNumber": "0900000001"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role(), Some(UserRole::Customer));

        let req = RegisterRequest {
            role: Some("employee".to_string()),
            ..req
        };
        assert_eq!(req.role(), Some(UserRole::Employee));

        let req = RegisterRequest {
            role: Some("owner".to_string()),
            ..req
        };
        assert_eq!(req.role(), None);
    }

    #[test]
    fn test_update_profile_partial() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"phoneNumber": "0911111111"}"#).unwrap();
        assert!(req.validate().is_ok());

        let update = ProfileUpdate::from(req);
        assert_eq!(update.phone_number.as_deref(), Some("0911111111"));
        assert!(update.email.is_none());

        let req: UpdateProfileRequest = serde_json::from_str(r#"{"email": "bad"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_user_response_hides_password() {
        let json = serde_json::to_value(UserResponse::from(User {
            id: 3,
            full_name: "Le Thi Hoa".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
            ..Default::default()
        }))
        .unwrap();

        assert_eq!(json["fullname"], "Le Thi Hoa");
        assert_eq!(json["status"], true);
        assert_eq!(json["role"], "CUSTOMER");
        assert!(!json.to_string().contains("argon2"));
    }
}
