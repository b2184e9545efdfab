//! Employee management handlers (admin only)

use crate::dto::auth::UserResponse;
use crate::dto::employee::CreateEmployeeRequest;
use crate::dto::{ApiResponse, SearchQuery};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use hms_auth::AuthenticatedUser;
use hms_core::models::EmployeeSearchField;
use hms_core::policy::Operation;
use hms_core::AppError;
use tracing::{info, instrument};
use validator::Validate;

/// List employee accounts
///
/// GET /api/v1/employees
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn list_employees(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ListEmployees)?;
    query.validate()?;

    let keyword = query.keyword();
    let page = state
        .identity
        .list_employees(
            keyword.as_deref(),
            EmployeeSearchField::from_code(query.field),
            query.pagination(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(page.map(UserResponse::from))))
}

/// Create an employee account
///
/// POST /api/v1/employees
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn create_employee(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateEmployeeRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::CreateEmployee)?;
    req.validate()?;

    let employee = state.identity.register(req.into_inner().into()).await?;
    info!(employee_id = employee.id, admin_id = user.user_id, "Employee account created");

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        UserResponse::from(employee),
        "Create Employee successfully",
    )))
}

/// Activate or deactivate an account
///
/// POST /api/v1/employees/account-action/{id}
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn account_action(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::ToggleAccount)?;

    let account = state
        .identity
        .toggle_active(user.user_id, path.into_inner())
        .await?;
    let message = if account.active {
        "Account activated"
    } else {
        "Account deactivated"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(UserResponse::from(account), message)))
}

/// Configure employee routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            .route("", web::get().to(list_employees))
            .route("", web::post().to(create_employee))
            .route("/account-action/{id}", web::post().to(account_action)),
    );
}
