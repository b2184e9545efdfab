//! Password hashing and verification using Argon2id
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hms_core::error::AppError;
use hms_core::AppResult;
use rand_core::OsRng;
use tracing::{debug, error};

/// Password hashing service using Argon2
#[derive(Debug, Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Hash a password with a fresh random salt
    ///
    /// # Examples
    ///
    /// ```
    /// use hms_auth::PasswordService;
    ///
    /// let password_service = PasswordService::new();
    /// let hash = password_service.hash_password("123456")?;
    /// assert!(hash.starts_with("$argon2"));
    /// # Ok::<(), hms_core::error::AppError>(())
    /// ```
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "Failed to hash password");
                AppError::PasswordHash(format!("Password hashing failed: {}", e))
            })?;

        Ok(password_hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// `Ok(false)` means a well-formed hash that does not match; a malformed
    /// hash is an error.
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "Failed to parse password hash");
            AppError::PasswordHash(format!("Invalid password hash format: {}", e))
        })?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                debug!("Password mismatch");
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Password verification error");
                Err(AppError::PasswordHash(format!(
                    "Password verification failed: {}",
                    e
                )))
            }
        }
    }

    /// Like [`verify_password`](Self::verify_password), but a mismatch is
    /// `InvalidCredentials`
    pub fn check(&self, password: &str, hash: &str) -> AppResult<()> {
        if self.verify_password(password, hash)? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new();
        let hash = service.hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(service.verify_password("correct horse", &hash).unwrap());
        assert!(!service.verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let service = PasswordService::new();
        let hash1 = service.hash_password("123456").unwrap();
        let hash2 = service.hash_password("123456").unwrap();

        assert_ne!(hash1, hash2);
        assert!(service.verify_password("123456", &hash1).unwrap());
        assert!(service.verify_password("123456", &hash2).unwrap());
    }

    #[test]
    fn test_check_maps_mismatch_to_invalid_credentials() {
        let service = PasswordService::new();
        let hash = service.hash_password("mật khẩu").unwrap();

        assert!(service.check("mật khẩu", &hash).is_ok());
        assert!(matches!(
            service.check("mat khau", &hash),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_invalid_hash_format() {
        let service = PasswordService::new();
        let result = service.verify_password("password", "not_a_valid_hash");

        assert!(matches!(result, Err(AppError::PasswordHash(_))));
    }
}
