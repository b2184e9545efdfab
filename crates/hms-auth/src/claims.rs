//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{DateTime, Duration, TimeZone, Utc};
use hms_core::models::{User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
///
/// Standard claims used in JWT tokens for user authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (email)
    pub sub: String,

    /// User id
    pub uid: i32,

    /// Unique token id, the key of the revocation set
    pub jti: String,

    /// User role
    pub role: UserRole,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, valid for `expires_in_secs` from now
    ///
    /// # Examples
    ///
    /// ```
    /// use hms_auth::Claims;
    /// use hms_core::models::{User, UserRole};
    ///
    /// let user = User { id: 1, email: "admin@gmail.com".into(), role: UserRole::Admin, ..Default::default() };
    /// let claims = Claims::for_user(&user, "hms.com.vn", 3600);
    /// assert_eq!(claims.sub, "admin@gmail.com");
    /// assert_eq!(claims.uid, 1);
    /// ```
    pub fn for_user(user: &User, issuer: &str, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: user.email.clone(),
            uid: user.id,
            jti: Uuid::new_v4().to_string(),
            role: user.role,
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Seconds until expiry, never negative
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> User {
        User {
            id: 42,
            email: "worker@hms.vn".to_string(),
            role: UserRole::Employee,
            ..Default::default()
        }
    }

    #[test]
    fn test_claims_for_user() {
        let claims = Claims::for_user(&employee(), "hms.com.vn", 3 * 3600);

        assert_eq!(claims.sub, "worker@hms.vn");
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.role, UserRole::Employee);
        assert_eq!(claims.iss, "hms.com.vn");
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_each_token_gets_fresh_jti() {
        let a = Claims::for_user(&employee(), "hms.com.vn", 60);
        let b = Claims::for_user(&employee(), "hms.com.vn", 60);
        assert_ne!(a.jti, b.jti);
        assert!(Uuid::parse_str(&a.jti).is_ok());
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::for_user(&employee(), "hms.com.vn", -3600);
        assert!(claims.is_expired());
        assert_eq!(claims.expires_in(), 0);
        assert!(claims.expires_at() < Utc::now());
    }
}
