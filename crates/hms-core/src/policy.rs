//! Access policy
//!
//! The single role x operation rule table. Request extractors consult it
//! before a handler runs; ownership checks (owner of a booking, bound
//! employee) live in the business services because they need the record.

use crate::error::AppError;
use crate::models::UserRole;
use crate::AppResult;
use std::fmt;

/// Every guarded operation exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    RegisterStaff,
    ViewOwnProfile,
    UpdateOwnProfile,
    ChangeOwnPassword,
    OrderBooking,
    AcceptBooking,
    FinishBooking,
    CancelBooking,
    ListBookings,
    ViewBooking,
    BrowseServices,
    CreateService,
    UpdateService,
    DeleteService,
    RateBooking,
    CheckRating,
    ListEmployees,
    CreateEmployee,
    ToggleAccount,
}

impl Operation {
    /// Open to unauthenticated callers
    pub fn is_public(self) -> bool {
        matches!(self, Operation::Register | Operation::BrowseServices)
    }

    /// Roles allowed to perform the operation once authenticated
    pub fn allowed_roles(self) -> &'static [UserRole] {
        use Operation::*;
        match self {
            Register | BrowseServices | ViewOwnProfile | UpdateOwnProfile | ChangeOwnPassword
            | ListBookings | ViewBooking => &UserRole::ALL,
            OrderBooking | CancelBooking | RateBooking | CheckRating => &[UserRole::Customer],
            AcceptBooking | FinishBooking => &[UserRole::Employee],
            RegisterStaff | CreateService | UpdateService | DeleteService | ListEmployees
            | CreateEmployee | ToggleAccount => &[UserRole::Admin],
        }
    }

    pub fn allows(self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Deny with `Forbidden` unless `role` may perform `op`
pub fn authorize(role: UserRole, op: Operation) -> AppResult<()> {
    if op.allows(role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{} may not perform {}", role, op)))
    }
}

/// Deny with `Forbidden` unless the caller is the record's owner
pub fn ensure_owner(caller_id: i32, owner_id: i32, what: &str) -> AppResult<()> {
    if caller_id == owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{} belongs to another user", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Operation::*;

    #[test]
    fn test_customer_permissions() {
        for op in [OrderBooking, CancelBooking, RateBooking, CheckRating, ListBookings] {
            assert!(authorize(UserRole::Customer, op).is_ok(), "{op}");
        }
        for op in [AcceptBooking, FinishBooking, CreateService, ToggleAccount] {
            assert!(authorize(UserRole::Customer, op).is_err(), "{op}");
        }
    }

    #[test]
    fn test_employee_permissions() {
        assert!(authorize(UserRole::Employee, AcceptBooking).is_ok());
        assert!(authorize(UserRole::Employee, FinishBooking).is_ok());
        assert!(authorize(UserRole::Employee, OrderBooking).is_err());
        assert!(authorize(UserRole::Employee, CancelBooking).is_err());
        assert!(authorize(UserRole::Employee, RateBooking).is_err());
    }

    #[test]
    fn test_admin_permissions() {
        for op in [CreateService, UpdateService, DeleteService, ListEmployees, ToggleAccount] {
            assert!(authorize(UserRole::Admin, op).is_ok(), "{op}");
        }
        // admins manage, they do not book or fulfill
        assert!(authorize(UserRole::Admin, OrderBooking).is_err());
        assert!(authorize(UserRole::Admin, AcceptBooking).is_err());
    }

    #[test]
    fn test_self_service_open_to_all_roles() {
        for role in UserRole::ALL {
            for op in [ViewOwnProfile, UpdateOwnProfile, ChangeOwnPassword, ListBookings] {
                assert!(op.allows(role));
            }
        }
    }

    #[test]
    fn test_public_operations() {
        assert!(Register.is_public());
        assert!(BrowseServices.is_public());
        assert!(!ListBookings.is_public());
        assert!(!CreateService.is_public());
    }

    #[test]
    fn test_denial_is_forbidden() {
        let err = authorize(UserRole::Customer, DeleteService).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(ensure_owner(3, 3, "booking").is_ok());
        assert!(matches!(
            ensure_owner(3, 4, "booking"),
            Err(AppError::Forbidden(_))
        ));
    }
}
