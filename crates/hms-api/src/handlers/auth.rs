//! Authentication handlers
//!
//! HTTP handlers for registration, sessions and the caller's own profile.

use crate::dto::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, LogoutRequest, RegisterRequest,
    UpdateProfileRequest, UserResponse,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use actix_web::{cookie::Cookie, web, HttpRequest, HttpResponse};
use hms_auth::{bearer_token, AuthenticatedUser};
use hms_core::models::UserRole;
use hms_core::policy::Operation;
use hms_core::AppError;
use hms_services::NewAccount;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Register an account
///
/// POST /api/v1/auth/register
///
/// Anyone may register a customer account; other roles need an admin token.
#[instrument(skip(state, caller, req), fields(email = %req.email))]
pub async fn register(
    state: web::Data<AppState>,
    caller: Option<AuthenticatedUser>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Register validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let role = req
        .role()
        .ok_or_else(|| AppError::Validation("Unknown role".to_string()))?;

    if role != UserRole::Customer {
        let admin = caller.ok_or_else(|| {
            AppError::Unauthorized("An admin token is required for this role".to_string())
        })?;
        admin.authorize(Operation::RegisterStaff)?;
        debug!(admin_id = admin.user_id, %role, "Admin registering staff account");
    }

    let req = req.into_inner();
    state
        .identity
        .register(NewAccount {
            full_name: req.fullname,
            email: req.email,
            password: req.password,
            phone_number: req.phone_number,
            role,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Register successfully")))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate()?;

    let user = state
        .identity
        .verify_credentials(req.email.trim(), &req.password)
        .await?;
    let issued = state.sessions.issue(&user)?;
    let expires_in = state.sessions.expiration_secs();

    info!(user_id = user.id, role = %user.role, "Login successful");

    let cookie = Cookie::build("token", issued.token.clone())
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success(LoginResponse {
            token: issued.token,
            role: user.role,
            expires_in,
        })))
}

/// Logout endpoint
///
/// POST /api/v1/auth/logout
///
/// Revokes the token from the body, or the caller's bearer token.
#[instrument(skip_all)]
pub async fn logout(
    state: web::Data<AppState>,
    http: HttpRequest,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<HttpResponse, AppError> {
    let token = body
        .and_then(|b| b.into_inner().token)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| bearer_token(&http))
        .ok_or_else(|| AppError::Unauthorized("No authentication token provided".to_string()))?;

    state.sessions.revoke(token.trim()).await?;

    let cookie = Cookie::build("token", "")
        .path("/")
        .http_only(true)
        .max_age(actix_web::cookie::time::Duration::seconds(0))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(ApiResponse::success("Logout successfully")))
}

/// Get current user info
///
/// GET /api/v1/auth/me
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn me(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ViewOwnProfile)?;

    let account = state.identity.get(user.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(account))))
}

/// Update the caller's profile
///
/// PUT /api/v1/auth/update-profile
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::UpdateOwnProfile)?;
    req.validate()?;

    state
        .identity
        .update_profile(user.user_id, req.into_inner().into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Update Profile Successfully")))
}

/// Change password
///
/// POST /api/v1/auth/change-password
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn change_password(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ChangeOwnPassword)?;
    req.validate().map_err(|e| {
        warn!("Change password validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    state
        .identity
        .change_password(user.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Change password successfully")))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/me", web::get().to(me))
            .route("/update-profile", web::put().to(update_profile))
            .route("/change-password", web::post().to(change_password)),
    );
}
