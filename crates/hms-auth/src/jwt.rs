//! JWT token creation and validation service
//!
//! Provides HS256 token signing and verification using the jsonwebtoken crate.

use crate::claims::Claims;
use hms_core::error::AppError;
use hms_core::models::User;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error, warn};

/// JWT Service for token creation and validation
///
/// Handles JWT token lifecycle including creation, validation, and expiration checks.
#[derive(Clone)]
pub struct JwtService {
    /// Issuer written into and required from every token
    issuer: String,

    /// Token lifetime in seconds
    expiration_secs: i64,

    /// Encoding key (cached)
    encoding_key: EncodingKey,

    /// Decoding key (cached)
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    ///
    /// # Examples
    ///
    /// ```
    /// use hms_auth::JwtService;
    ///
    /// let jwt_service = JwtService::new("my-secret-key", "hms.com.vn", 3600);
    /// ```
    pub fn new(secret: &str, issuer: &str, expiration_secs: i64) -> Self {
        Self {
            issuer: issuer.to_string(),
            expiration_secs,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Create a JWT token from claims
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if signing fails
    pub fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        debug!(
            email = %claims.sub,
            role = ?claims.role,
            exp = %claims.exp,
            "Creating JWT token"
        );

        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "Failed to create JWT token");
            AppError::Internal(format!("Token creation failed: {}", e))
        })
    }

    /// Issue a fresh token for a user, returning it with its claims
    pub fn issue(&self, user: &User) -> Result<(String, Claims), AppError> {
        let claims = Claims::for_user(user, &self.issuer, self.expiration_secs);
        let token = self.create_token(&claims)?;
        Ok((token, claims))
    }

    /// Validate a JWT token and extract claims
    ///
    /// Checks signature, issuer and expiry with no leeway.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `AppError::TokenExpired` if the token has expired
    /// - `AppError::InvalidToken` if the token is invalid
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_with(token, self.validation(true))?;

        debug!(
            email = %claims.sub,
            role = ?claims.role,
            "Token validated successfully"
        );

        Ok(claims)
    }

    /// Decode a token whose signature and issuer are valid, ignoring expiry
    ///
    /// Used by logout, which must accept tokens that have already expired.
    pub fn decode_for_revocation(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, self.validation(false))
    }

    /// Token lifetime in seconds
    pub fn expiration_secs(&self) -> i64 {
        self.expiration_secs
    }

    fn validation(&self, check_exp: bool) -> Validation {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = check_exp;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }

    fn decode_with(&self, token: &str, validation: Validation) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    warn!("Token expired");
                    AppError::TokenExpired
                }
                _ => {
                    warn!(error = %e, "Invalid token");
                    AppError::InvalidToken(format!("Token validation failed: {}", e))
                }
            })
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::models::UserRole;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-12345";
    const ISSUER: &str = "hms.com.vn";

    fn customer() -> User {
        User {
            id: 5,
            email: "lan@gmail.com".to_string(),
            role: UserRole::Customer,
            ..Default::default()
        }
    }

    #[test]
    fn test_issue_and_validate_token() {
        let jwt_service = JwtService::new(TEST_SECRET, ISSUER, 3600);

        let (token, issued) = jwt_service.issue(&customer()).unwrap();
        assert!(!token.is_empty());

        let decoded = jwt_service.validate_token(&token).unwrap();
        assert_eq!(decoded, issued);
        assert_eq!(decoded.uid, 5);
        assert_eq!(decoded.role, UserRole::Customer);
    }

    #[test]
    fn test_expired_token() {
        let jwt_service = JwtService::new(TEST_SECRET, ISSUER, 3600);

        let claims = Claims::for_user(&customer(), ISSUER, -10);
        let token = jwt_service.create_token(&claims).unwrap();

        let result = jwt_service.validate_token(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_expired_token_still_decodes_for_revocation() {
        let jwt_service = JwtService::new(TEST_SECRET, ISSUER, 3600);

        let claims = Claims::for_user(&customer(), ISSUER, -10);
        let token = jwt_service.create_token(&claims).unwrap();

        let decoded = jwt_service.decode_for_revocation(&token).unwrap();
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_invalid_token() {
        let jwt_service = JwtService::new(TEST_SECRET, ISSUER, 3600);

        let result = jwt_service.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_token_with_different_secret() {
        let jwt_service1 = JwtService::new("secret1", ISSUER, 3600);
        let jwt_service2 = JwtService::new("secret2", ISSUER, 3600);

        let (token, _) = jwt_service1.issue(&customer()).unwrap();

        let result = jwt_service2.validate_token(&token);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
        assert!(jwt_service2.decode_for_revocation(&token).is_err());
    }

    #[test]
    fn test_issuer_mismatch_rejected() {
        let ours = JwtService::new(TEST_SECRET, ISSUER, 3600);
        let theirs = JwtService::new(TEST_SECRET, "someone-else", 3600);

        let (token, _) = theirs.issue(&customer()).unwrap();
        assert!(matches!(
            ours.validate_token(&token),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_debug_impl_hides_secret() {
        let jwt_service = JwtService::new(TEST_SECRET, ISSUER, 3600);
        let debug_str = format!("{:?}", jwt_service);

        assert!(debug_str.contains("JwtService"));
        assert!(debug_str.contains("3600"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(TEST_SECRET));
    }
}
