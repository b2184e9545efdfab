//! Fixtures for tests against a live database
//!
//! Tests built on these are `#[ignore]`d. Run them with `DATABASE_URL`
//! pointing at a scratch database: `cargo test -p hms-db -- --ignored`.
//! Every fixture row carries a unique tag so runs never collide.

use super::{PgBookingRepository, PgServiceRepository, PgUserRepository};
use crate::pool::{create_pool, run_migrations};
use chrono::{Duration, Utc};
use hms_core::config::DatabaseConfig;
use hms_core::models::{Booking, Service, User, UserRole};
use hms_core::traits::{BookingRepository, Repository};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU32, Ordering};

pub async fn pool() -> PgPool {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/hms".to_string()),
        max_connections: 5,
        min_connections: 1,
        acquire_timeout_secs: 5,
        run_migrations: true,
    };

    let pool = create_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Digits unique across runs and within the process
pub fn unique() -> String {
    static SEQ: AtomicU32 = AtomicU32::new(0);
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!(
        "{}{:04}",
        nanos % 1_000_000_000_000,
        SEQ.fetch_add(1, Ordering::Relaxed) % 10_000
    )
}

pub async fn user(pool: &PgPool, role: UserRole) -> User {
    let tag = unique();
    PgUserRepository::new(pool.clone())
        .create(&User {
            full_name: format!("User {}", tag),
            email: format!("u{}@hms.test", tag),
            phone_number: format!("09{}", tag),
            password_hash: "$argon2id$test".to_string(),
            role,
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn service(pool: &PgPool, name: &str) -> Service {
    PgServiceRepository::new(pool.clone())
        .create(&Service {
            name: name.to_string(),
            price: Decimal::new(15000000, 2),
            category: "Plumbing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

/// A PENDING booking for tomorrow
pub async fn booking(pool: &PgPool, service_id: i32, customer_id: i32) -> Booking {
    PgBookingRepository::new(pool.clone())
        .create(&Booking {
            service_id,
            customer_id,
            hire_at: Utc::now() + Duration::days(1),
            address: "12 Nguyen Trai, Ha Noi".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}
