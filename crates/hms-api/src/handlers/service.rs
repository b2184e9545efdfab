//! Service catalog handlers

use crate::dto::service::{
    AverageRatingResponse, CreateServiceRequest, ServiceListQuery, ServiceResponse,
    UpdateServiceRequest,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use hms_auth::AuthenticatedUser;
use hms_core::policy::Operation;
use hms_core::AppError;
use tracing::{info, instrument};
use validator::Validate;

/// Search the catalog
///
/// GET /api/v1/services
#[instrument(skip(state))]
pub async fn list_services(
    state: web::Data<AppState>,
    query: web::Query<ServiceListQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let page = state
        .catalog
        .search(&query.filter(), query.pagination())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(page.map(ServiceResponse::from))))
}

/// GET /api/v1/services/{id}
#[instrument(skip(state))]
pub async fn get_service(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let summary = state.catalog.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ServiceResponse::from(summary))))
}

/// GET /api/v1/services/{id}/rating
#[instrument(skip(state))]
pub async fn get_service_rating(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let average_rating = state.catalog.average_rating(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(AverageRatingResponse { average_rating })))
}

/// Create a service
///
/// POST /api/v1/services
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn create_service(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::CreateService)?;
    req.validate()?;

    let service = state.catalog.create(req.into_inner().into()).await?;
    let summary = state.catalog.get(service.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ServiceResponse::from(summary),
        "Create Service successfully",
    )))
}

/// Update a service
///
/// PUT /api/v1/services/{id}
#[instrument(skip(state, user, req), fields(user_id = user.user_id))]
pub async fn update_service(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
    req: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::UpdateService)?;
    req.validate()?;

    let id = path.into_inner();
    state.catalog.update(id, req.into_inner().into()).await?;
    let summary = state.catalog.get(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        ServiceResponse::from(summary),
        "Update Service successfully",
    )))
}

/// Remove a service from the catalog
///
/// DELETE /api/v1/services/{id}
#[instrument(skip(state, user), fields(user_id = user.user_id))]
pub async fn delete_service(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    user.authorize(Operation::DeleteService)?;

    let id = path.into_inner();
    state.catalog.delete(id).await?;
    info!(service_id = id, admin_id = user.user_id, "Service removed from catalog");

    Ok(HttpResponse::Ok().json(ApiResponse::success("Delete Service successfully")))
}

/// Configure service routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .route("", web::get().to(list_services))
            .route("", web::post().to(create_service))
            .route("/{id}", web::get().to(get_service))
            .route("/{id}", web::put().to(update_service))
            .route("/{id}", web::delete().to(delete_service))
            .route("/{id}/rating", web::get().to(get_service_rating)),
    );
}
