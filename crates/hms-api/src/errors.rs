//! Outermost error recovery
//!
//! Extractor failures become 400 `validation_error` bodies, unknown routes
//! get a JSON 404, and any 500 that escaped without a structured body is
//! rewritten into the standard error envelope.

use actix_web::{
    dev::ServiceResponse,
    error::InternalError,
    http::header,
    middleware::ErrorHandlerResponse,
    web, Error, HttpRequest, HttpResponse, ResponseError,
};
use hms_core::error::UNKNOWN_ERROR_CODE;
use hms_core::AppError;
use serde_json::json;
use tracing::{error, warn};

fn bad_request<E>(err: E, req: &HttpRequest) -> Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    warn!(path = %req.path(), error = %err, "Rejected malformed request");
    let response = AppError::Validation(err.to_string()).error_response();
    InternalError::from_response(err, response).into()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| bad_request(err, req))
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req| bad_request(err, req))
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| bad_request(err, req))
}

/// Default service for unmatched routes
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    AppError::NotFound(format!("No route for {} {}", req.method(), req.path())).error_response()
}

/// Replace an unstructured 500 body with the standard envelope
pub fn render_internal_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let structured = res
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if structured {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    error!(path = %res.request().path(), "Unhandled internal error");
    let (req, _) = res.into_parts();
    let response = HttpResponse::InternalServerError().json(json!({
        "code": UNKNOWN_ERROR_CODE,
        "error": "internal_error",
        "message": "Uncategorized error",
        "status": 500,
    }));

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body::<B>(),
    ))
}
