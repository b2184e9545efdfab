//! Token revocation set backed by the `revoked_tokens` table

use chrono::{DateTime, Utc};
use hms_core::{models::RevokedToken, traits::RevokedTokenRepository, AppError, AppResult};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of RevokedTokenRepository
pub struct PgRevokedTokenRepository {
    pool: PgPool,
}

impl PgRevokedTokenRepository {
    /// Create a new revocation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevokedTokenRepository for PgRevokedTokenRepository {
    #[instrument(skip(self, token), fields(jti = %token.jti))]
    async fn revoke(&self, token: &RevokedToken) -> AppResult<()> {
        debug!("Revoking token until {}", token.expires_at);

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at, revoked_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(&token.jti)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error revoking token: {}", e);
            AppError::Database(format!("Failed to revoke token: {}", e))
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error checking revocation: {}", e);
                    AppError::Database(format!("Failed to check revocation: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error purging revoked tokens: {}", e);
                AppError::Database(format!("Failed to purge revoked tokens: {}", e))
            })?;

        debug!("Purged {} expired revocation entries", result.rows_affected());
        Ok(result.rows_affected())
    }
}
