//! Route tests for the HTTP API
//!
//! The full application is assembled over the in-memory store, so these
//! run without a database.

use actix_web::{
    http::{header, StatusCode},
    middleware::ErrorHandlers,
    test, web, App,
};
use chrono::{Duration, Utc};
use hms_api::{configure_routes, errors, AppState, Repositories};
use hms_auth::{JwtService, PasswordService, SessionManager};
use hms_core::models::{User, UserRole};
use hms_services::testing::MemoryStore;
use hms_services::NewAccount;
use serde_json::{json, Value};
use std::sync::Arc;

struct Harness {
    state: Arc<AppState>,
    sessions: Arc<SessionManager>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let sessions = Arc::new(SessionManager::new(
            JwtService::new("route-test-secret", "hms.com.vn", 3600),
            store.clone(),
        ));
        let repos = Repositories {
            users: store.clone(),
            services: store.clone(),
            bookings: store.clone(),
            ratings: store,
        };
        let state = Arc::new(AppState::new(repos, sessions.clone(), PasswordService::new()));

        Self { state, sessions }
    }

    async fn account(&self, name: &str, email: &str, phone: &str, role: UserRole) -> User {
        self.state
            .identity
            .register(NewAccount {
                full_name: name.to_string(),
                email: email.to_string(),
                password: "123456".to_string(),
                phone_number: phone.to_string(),
                role,
            })
            .await
            .unwrap()
    }

    /// Bearer header value for a freshly issued token
    fn bearer(&self, user: &User) -> (header::HeaderName, String) {
        let issued = self.sessions.issue(user).unwrap();
        (header::AUTHORIZATION, format!("Bearer {}", issued.token))
    }
}

macro_rules! app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($harness.state.clone()))
                .app_data(web::Data::from($harness.sessions.clone()))
                .app_data(errors::json_config())
                .app_data(errors::query_config())
                .app_data(errors::path_config())
                .wrap(ErrorHandlers::new().handler(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    errors::render_internal_error,
                ))
                .configure(configure_routes)
                .default_service(web::route().to(errors::not_found)),
        )
        .await
    };
}

/// Send a request, returning the status and the JSON body
macro_rules! call {
    ($app:expr, $req:expr $(,)?) => {{
        let resp = test::call_service($app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let h = Harness::new();
    let app = app!(h);

    let (status, body) = call!(&app, test::TestRequest::get().uri("/api/v1/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call!(&app, test::TestRequest::get().uri("/api/v1/nowhere"));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1404);
    assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn test_register_login_logout() {
    let h = Harness::new();
    let app = app!(h);

    let register = json!({
        "fullname": "Nguyen Van An",
        "email": "an@gmail.com",
        "password": "123456",
        "phoneNumber": "0900000001"
    });
    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&register),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"code": 1000, "result": "Register successfully"}));

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&register),
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1004);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "an@gmail.com", "password": "wrong-password"})),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "an@gmail.com", "password": "123456"})),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["role"], "CUSTOMER");
    assert_eq!(body["result"]["expiresIn"], 3600);
    let token = body["result"]["token"].as_str().unwrap().to_string();
    let bearer = (header::AUTHORIZATION, format!("Bearer {}", token));

    let (status, body) = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer.clone()),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["fullname"], "Nguyen Van An");
    assert_eq!(body["result"]["status"], true);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .set_json(json!({ "token": token })),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Logout successfully");

    let (status, body) = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header(bearer),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_revoked");
}

#[actix_web::test]
async fn test_staff_registration_needs_admin() {
    let h = Harness::new();
    let admin = h.account("Admin", "admin@gmail.com", "0123456789", UserRole::Admin).await;
    let customer = h.account("An", "an@gmail.com", "0900000001", UserRole::Customer).await;
    let app = app!(h);

    let employee = json!({
        "fullname": "Tran Binh",
        "email": "binh@hms.vn",
        "password": "123456",
        "phoneNumber": "0910000001",
        "role": "EMPLOYEE"
    });

    let (status, _) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(&employee),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .insert_header(h.bearer(&customer))
            .set_json(&employee),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1403);

    let (status, _) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .insert_header(h.bearer(&admin))
            .set_json(&employee),
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_malformed_input_is_validation_error() {
    let h = Harness::new();
    let app = app!(h);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header(header::ContentType::json())
            .set_payload("{\"email\": "),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1400);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = call!(
        &app,
        test::TestRequest::get().uri("/api/v1/services?pageNumber=abc"),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1400);

    let (status, _) = call!(&app, test::TestRequest::get().uri("/api/v1/services/abc"));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_catalog_admin_only() {
    let h = Harness::new();
    let admin = h.account("Admin", "admin@gmail.com", "0123456789", UserRole::Admin).await;
    let customer = h.account("An", "an@gmail.com", "0900000001", UserRole::Customer).await;
    let app = app!(h);

    let pipe = json!({"name": "Pipe repair", "price": 150000, "category": "Plumbing"});

    let (status, body) = call!(
        &app,
        test::TestRequest::post().uri("/api/v1/services").set_json(&pipe),
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1401);

    let (status, _) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/services")
            .insert_header(h.bearer(&customer))
            .set_json(&pipe),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/services")
            .insert_header(h.bearer(&admin))
            .set_json(json!({"name": "Odd", "price": -1, "category": "Misc"})),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1005);

    // beyond what NUMERIC(14,2) stores
    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/services")
            .insert_header(h.bearer(&admin))
            .set_json(json!({"name": "Palace", "price": 1e12, "category": "Misc"})),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1005);

    for body in [
        pipe.clone(),
        json!({"name": "Deep cleaning", "price": 400000, "category": "Cleaning"}),
    ] {
        let (status, _) = call!(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/services")
                .insert_header(h.bearer(&admin))
                .set_json(body),
        );
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call!(
        &app,
        test::TestRequest::get().uri("/api/v1/services?keyword=pipe&field=1&pageSize=5"),
    );
    assert_eq!(status, StatusCode::OK);
    let page = &body["result"];
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["pageSize"], 5);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["items"][0]["name"], "Pipe repair");
    assert_eq!(page["items"][0]["averageRating"], 0.0);
    let id = page["items"][0]["id"].as_i64().unwrap();

    let (status, body) = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/services?pageNumber=9223372036854775807&pageSize=100"),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["totalItems"], 2);
    assert_eq!(body["result"]["items"], json!([]));

    let (status, _) = call!(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/services/{}", id))
            .insert_header(h.bearer(&admin)),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/services/{}", id)),
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1006);
}

#[actix_web::test]
async fn test_booking_lifecycle() {
    let h = Harness::new();
    let admin = h.account("Admin", "admin@gmail.com", "0123456789", UserRole::Admin).await;
    let customer = h.account("Nguyen An", "an@gmail.com", "0900000001", UserRole::Customer).await;
    let e1 = h.account("Tran Binh", "binh@hms.vn", "0910000001", UserRole::Employee).await;
    let e2 = h.account("Pham Cuong", "cuong@hms.vn", "0910000002", UserRole::Employee).await;
    let app = app!(h);

    let (_, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/services")
            .insert_header(h.bearer(&admin))
            .set_json(json!({"name": "Pipe repair", "price": 150000, "category": "Plumbing"})),
    );
    let service_id = body["result"]["id"].as_i64().unwrap();

    let order = json!({
        "serviceId": service_id,
        "hireAt": (Utc::now() + Duration::days(2)).to_rfc3339(),
        "address": "12 Le Loi, District 1"
    });
    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(h.bearer(&e1))
            .set_json(&order),
    );
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/bookings")
            .insert_header(h.bearer(&customer))
            .set_json(&order),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Order booking successfully");

    let (_, body) = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/bookings")
            .insert_header(h.bearer(&e2)),
    );
    let booking = &body["result"]["items"][0];
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["employeeId"], Value::Null);
    let booking_id = booking["id"].as_i64().unwrap();
    let action = |name: &str| format!("/api/v1/bookings/{}/{}", booking_id, name);

    let (status, _) = call!(
        &app,
        test::TestRequest::patch()
            .uri(&action("accept"))
            .insert_header(h.bearer(&e1)),
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call!(
        &app,
        test::TestRequest::patch()
            .uri(&action("accept"))
            .insert_header(h.bearer(&e2)),
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1008);

    let (status, body) = call!(
        &app,
        test::TestRequest::patch()
            .uri(&action("cancel"))
            .insert_header(h.bearer(&customer)),
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1010);

    let (status, _) = call!(
        &app,
        test::TestRequest::patch()
            .uri(&action("finish"))
            .insert_header(h.bearer(&e2)),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        &app,
        test::TestRequest::patch()
            .uri(&action("finish"))
            .insert_header(h.bearer(&e1)),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Finish Booking successfully");

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/rating")
            .insert_header(h.bearer(&customer))
            .set_json(json!({"bookingId": booking_id, "rate": 5, "comment": "Great"})),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["score"], 5);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/rating")
            .insert_header(h.bearer(&customer))
            .set_json(json!({"bookingId": booking_id, "score": 4})),
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1011);

    let (_, body) = call!(
        &app,
        test::TestRequest::get().uri(&format!("/api/v1/services/{}/rating", service_id)),
    );
    assert_eq!(body["result"]["averageRating"], 5.0);

    let (_, body) = call!(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/rating/check?serviceId={}", service_id))
            .insert_header(h.bearer(&customer)),
    );
    assert_eq!(body["result"]["hasRated"], true);

    let (status, _) = call!(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/v1/rating/check?serviceId={}&customerId={}",
                service_id,
                customer.id + 100
            ))
            .insert_header(h.bearer(&customer)),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call!(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/bookings/{}", booking_id))
            .insert_header(h.bearer(&customer)),
    );
    assert_eq!(body["result"]["status"], "COMPLETED");
    assert_eq!(body["result"]["employeeName"], "Tran Binh");
    assert_eq!(body["result"]["hasRated"], true);
}

#[actix_web::test]
async fn test_employee_management() {
    let h = Harness::new();
    let admin = h.account("Admin", "admin@gmail.com", "0123456789", UserRole::Admin).await;
    let app = app!(h);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/employees")
            .insert_header(h.bearer(&admin))
            .set_json(json!({
                "fullname": "Tran Van Binh",
                "email": "binh@hms.vn",
                "password": "123456",
                "phoneNumber": "0910000001"
            })),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["role"], "EMPLOYEE");
    let employee_id = body["result"]["id"].as_i64().unwrap();

    let (_, body) = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees?keyword=binh&field=2")
            .insert_header(h.bearer(&admin)),
    );
    assert_eq!(body["result"]["totalItems"], 1);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/employees/account-action/{}", employee_id))
            .insert_header(h.bearer(&admin)),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], false);

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({"email": "binh@hms.vn", "password": "123456"})),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1009);

    let (status, _) = call!(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/employees/account-action/{}", admin.id))
            .insert_header(h.bearer(&admin)),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}
