//! HMS Backend Server
//!
//! Home service marketplace: customers book services, employees fulfill
//! them, admins run the catalog and staff accounts.

use actix_cors::Cors;
use actix_web::{
    http::{header, StatusCode},
    middleware::{self, ErrorHandlers},
    web, App, HttpResponse, HttpServer,
};
use hms_api::{configure_routes, errors, AppState, Repositories};
use hms_auth::{JwtService, PasswordService, SessionManager};
use hms_core::config::{AppConfig, SeedConfig};
use hms_core::models::UserRole;
use hms_core::AppResult;
use hms_db::{create_pool, run_migrations, PgRevokedTokenRepository};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// `LOG_LEVEL` sets the level for HMS crates; `LOG_FORMAT=json` switches
/// to structured output.
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hms_server={0},hms_api={0},hms_services={0},hms_auth={0},hms_db={0},actix_web=info,sqlx=warn",
            log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(fmt::layer().json().with_current_span(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Create the configured bootstrap accounts that do not exist yet
async fn seed_accounts(state: &AppState, seed: &SeedConfig) -> AppResult<()> {
    let accounts = [
        (&seed.admin, UserRole::Admin),
        (&seed.employee, UserRole::Employee),
        (&seed.customer, UserRole::Customer),
    ];

    for (account, role) in accounts {
        let Some(account) = account else { continue };
        if let Some(user) = state.identity.ensure_account(account, role).await? {
            info!(user_id = user.id, email = %user.email, %role, "Seeded account");
        }
    }
    Ok(())
}

/// Periodically purge revocation entries for tokens that have expired
fn spawn_revocation_sweeper(sessions: Arc<SessionManager>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "Purged expired token revocations"),
                Err(e) => warn!("Revocation sweep failed: {}", e),
            }
        }
    });
}

fn cors(origins: &str) -> Cors {
    let origins: Vec<String> = origins
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origin
                .to_str()
                .is_ok_and(|origin| origins.iter().any(|o| o == origin))
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::COOKIE,
        ])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting HMS Backend v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    }

    let jwt = JwtService::new(
        &config.auth.jwt_secret,
        &config.auth.jwt_issuer,
        config.auth.jwt_expiration_secs(),
    );
    let sessions = Arc::new(SessionManager::new(
        jwt,
        Arc::new(PgRevokedTokenRepository::new(pool.clone())),
    ));
    info!(
        "JWT sessions configured with {} second token expiration",
        sessions.expiration_secs()
    );

    let state = Arc::new(AppState::new(
        Repositories::postgres(&pool),
        sessions.clone(),
        PasswordService::new(),
    ));

    if let Err(e) = seed_accounts(&state, &config.seed).await {
        warn!("Seeding bootstrap accounts failed: {}", e);
    }

    spawn_revocation_sweeper(
        sessions.clone(),
        Duration::from_secs(config.auth.revocation_sweep_secs.max(1)),
    );

    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);
    let cors_origins = config.server.cors_origins.clone();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(state.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(errors::json_config())
            .app_data(errors::query_config())
            .app_data(errors::path_config())
            // Middleware
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::INTERNAL_SERVER_ERROR, errors::render_internal_error),
            )
            .wrap(cors(&cors_origins))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
            .default_service(web::route().to(errors::not_found))
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
