//! Service catalog repository implementation
//!
//! Services are soft-deleted: `deleted_at` hides them from lookups and
//! search while bookings keep referencing the row.

use super::contains_pattern;
use chrono::{DateTime, Utc};
use hms_core::{
    models::{Service, ServiceFilter},
    traits::{Repository, ServiceRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

const SERVICE_COLUMNS: &str = r#"
    id, name, price, description, image_url, category,
    deleted_at, created_at, updated_at
"#;

/// PostgreSQL implementation of ServiceRepository
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    /// Create a new service repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Service, i32> for PgServiceRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Service>> {
        debug!("Finding service by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ServiceRow>(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service {}: {}", id, e);
            AppError::Database(format!("Failed to find service: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &Service) -> AppResult<Service> {
        debug!("Creating service: {}", entity.name);

        let row = sqlx::query_as::<sqlx::Postgres, ServiceRow>(&format!(
            r#"
            INSERT INTO services (name, price, description, image_url, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(&entity.name)
        .bind(entity.price)
        .bind(&entity.description)
        .bind(&entity.image_url)
        .bind(&entity.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating service: {}", e);
            AppError::Database(format!("Failed to create service: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &Service) -> AppResult<Service> {
        debug!("Updating service: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, ServiceRow>(&format!(
            r#"
            UPDATE services
            SET name = $2,
                price = $3,
                description = $4,
                image_url = $5,
                category = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            SERVICE_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.name)
        .bind(entity.price)
        .bind(&entity.description)
        .bind(&entity.image_url)
        .bind(&entity.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating service {}: {}", entity.id, e);
            AppError::Database(format!("Failed to update service: {}", e))
        })?;

        row.map(Into::into).ok_or(AppError::ServiceNotFound)
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    #[instrument(skip(self))]
    async fn find_available(&self, id: i32) -> AppResult<Option<Service>> {
        debug!("Finding available service: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, ServiceRow>(&format!(
            "SELECT {} FROM services WHERE id = $1 AND deleted_at IS NULL",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding service {}: {}", id, e);
            AppError::Database(format!("Failed to find service: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i32) -> AppResult<bool> {
        debug!("Deleting service: {}", id);

        let result = sqlx::query(
            r#"
            UPDATE services
            SET deleted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error deleting service {}: {}", id, e);
            AppError::Database(format!("Failed to delete service: {}", e))
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        filter: &ServiceFilter,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Service>, i64)> {
        debug!("Searching services: {:?}", filter);

        let keyword = contains_pattern(filter.keyword.as_deref());
        let where_clause = r#"
            WHERE deleted_at IS NULL
              AND ($1::TEXT IS NULL
                   OR ($2::TEXT = 'name' AND name ILIKE $1 ESCAPE '\')
                   OR ($2::TEXT = 'category' AND category ILIKE $1 ESCAPE '\')
                   OR ($2::TEXT = 'any' AND (name ILIKE $1 ESCAPE '\'
                                             OR category ILIKE $1 ESCAPE '\')))
              AND ($3::NUMERIC IS NULL OR price >= $3)
              AND ($4::NUMERIC IS NULL OR price <= $4)
        "#;

        let total: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM services {}", where_clause))
                .bind(keyword.as_deref())
                .bind(filter.field.as_str())
                .bind(filter.from_price)
                .bind(filter.to_price)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting services: {}", e);
                    AppError::Database(format!("Failed to count services: {}", e))
                })?;

        let rows = sqlx::query_as::<sqlx::Postgres, ServiceRow>(&format!(
            "SELECT {} FROM services {} ORDER BY id LIMIT $5 OFFSET $6",
            SERVICE_COLUMNS, where_clause
        ))
        .bind(keyword.as_deref())
        .bind(filter.field.as_str())
        .bind(filter.from_price)
        .bind(filter.to_price)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error searching services: {}", e);
            AppError::Database(format!("Failed to search services: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: i32,
    name: String,
    price: Decimal,
    description: Option<String>,
    image_url: Option<String>,
    category: String,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            image_url: row.image_url,
            category: row.category,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
