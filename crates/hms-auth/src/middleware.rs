//! Actix-web request extractors for authenticated callers
//!
//! [`AuthenticatedUser`] establishes who is calling (401 on any token
//! problem); handlers then ask the access policy whether that caller may
//! perform the operation (403 on denial).

use crate::session::SessionManager;
use crate::Claims;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use hms_core::error::AppError;
use hms_core::models::UserRole;
use hms_core::policy::{self, Operation};
use hms_core::AppResult;
use tracing::{debug, warn};

/// Extract the raw token from a request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    req.cookie("token").map(|cookie| cookie.value().to_string())
}

/// Authenticated user extractor
///
/// Validates the bearer token, including the revocation set, on every request.
///
/// # Examples
///
/// ```no_run
/// use actix_web::HttpResponse;
/// use hms_auth::AuthenticatedUser;
/// use hms_core::policy::Operation;
///
/// async fn order(user: AuthenticatedUser) -> Result<HttpResponse, hms_core::AppError> {
///     user.authorize(Operation::OrderBooking)?;
///     Ok(HttpResponse::Ok().finish())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Id of the authenticated user
    pub user_id: i32,

    /// Email the token was issued to
    pub email: String,

    /// Role of the authenticated user
    pub role: UserRole,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Ask the access policy whether this caller may perform `op`
    pub fn authorize(&self, op: Operation) -> AppResult<()> {
        policy::authorize(self.role, op).map_err(|e| {
            warn!(
                user_id = self.user_id,
                role = %self.role,
                operation = %op,
                "Access denied"
            );
            e
        })
    }

    /// Check if user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            email: claims.sub.clone(),
            role: claims.role,
            claims,
        }
    }
}

async fn authenticate(
    sessions: Option<web::Data<SessionManager>>,
    token: Option<String>,
) -> AppResult<AuthenticatedUser> {
    let sessions = sessions.ok_or_else(|| {
        warn!("SessionManager not found in app data");
        AppError::Internal("Authentication service not configured".to_string())
    })?;

    let token = token.ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = sessions.validate(&token).await?;

    debug!(
        user_id = claims.uid,
        role = ?claims.role,
        "User authenticated successfully"
    );

    Ok(claims.into())
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let sessions = req.app_data::<web::Data<SessionManager>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move { authenticate(sessions, token).await.map_err(Into::into) })
    }
}
