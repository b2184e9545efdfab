//! Authentication for HMS
//!
//! This crate provides JWT-based authentication with a revocation set,
//! password hashing with Argon2, and the Actix-web extractor that turns a
//! bearer token into an [`AuthenticatedUser`].
//!
//! # Features
//!
//! - JWT token creation and validation (issuer and expiry checked, no leeway)
//! - Logout via token revocation, with periodic purge of expired entries
//! - Argon2 password hashing and verification
//! - Request extractor that consults the access policy
//!
//! # Examples
//!
//! ## Password hashing
//!
//! ```no_run
//! use hms_auth::PasswordService;
//!
//! let password_service = PasswordService::new();
//! let hash = password_service.hash_password("secure_password")?;
//! let is_valid = password_service.verify_password("secure_password", &hash)?;
//! assert!(is_valid);
//! # Ok::<(), hms_core::error::AppError>(())
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{bearer_token, AuthenticatedUser};
pub use password::PasswordService;
pub use session::{IssuedToken, SessionManager};
