//! User repository implementation
//!
//! Provides PostgreSQL-backed storage for marketplace accounts.

use super::{contains_pattern, violated_constraint};
use chrono::{DateTime, Utc};
use hms_core::{
    models::{normalize_email, EmployeeSearchField, ProfileUpdate, User, UserRole},
    traits::{Repository, UserRepository},
    AppError, AppResult,
};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, instrument};

const USER_COLUMNS: &str = r#"
    id, full_name, email, phone_number, password_hash,
    role, active, created_at, updated_at
"#;

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse user role from string
    fn parse_role(s: &str) -> UserRole {
        UserRole::from_str(s).unwrap_or(UserRole::Customer)
    }

    /// Translate a write failure, surfacing uniqueness violations
    fn write_error(action: &str, e: sqlx::Error) -> AppError {
        match violated_constraint(&e).as_deref() {
            Some("users_email_key") => AppError::EmailExists,
            Some("users_phone_number_key") => AppError::PhoneExists,
            Some(other) => {
                error!("Unexpected unique violation on {}: {}", other, e);
                AppError::Conflict(format!("Failed to {} user", action))
            }
            None => {
                error!("Database error trying to {} user: {}", action, e);
                AppError::Database(format!("Failed to {} user: {}", action, e))
            }
        }
    }
}

#[async_trait]
impl Repository<User, i32> for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user {}: {}", id, e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self, entity))]
    async fn create(&self, entity: &User) -> AppResult<User> {
        debug!("Creating user: {}", entity.email);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            r#"
            INSERT INTO users (
                full_name, email, phone_number, password_hash, role, active
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&entity.full_name)
        .bind(normalize_email(&entity.email))
        .bind(&entity.phone_number)
        .bind(&entity.password_hash)
        .bind(entity.role.as_str())
        .bind(entity.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error("create", e))?;

        Ok(row.into())
    }

    /// Writes the profile columns and password hash; role and active
    /// flag are left as stored
    #[instrument(skip(self, entity))]
    async fn update(&self, entity: &User) -> AppResult<User> {
        debug!("Updating user: {}", entity.id);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            r#"
            UPDATE users
            SET full_name = $2,
                email = $3,
                phone_number = $4,
                password_hash = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(entity.id)
        .bind(&entity.full_name)
        .bind(normalize_email(&entity.email))
        .bind(&entity.phone_number)
        .bind(&entity.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error("update", e))?;

        row.map(Into::into).ok_or(AppError::UserNotFound)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = $1",
            USER_COLUMNS
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by email: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, id: i32, update: &ProfileUpdate) -> AppResult<Option<User>> {
        debug!("Updating profile of user: {}", id);

        let row = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone_number = COALESCE($4, phone_number),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.full_name.as_deref())
        .bind(update.email.as_deref().map(normalize_email))
        .bind(update.phone_number.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error("update", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, password_hash))]
    async fn set_password_hash(&self, id: i32, password_hash: &str) -> AppResult<bool> {
        debug!("Replacing password hash of user: {}", id);

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating password of user {}: {}", id, e);
            AppError::Database(format!("Failed to update password: {}", e))
        })?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        debug!("Finding user by phone: {}", phone);

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            "SELECT {} FROM users WHERE phone_number = $1",
            USER_COLUMNS
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by phone: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self))]
    async fn toggle_active(&self, id: i32) -> AppResult<Option<User>> {
        debug!("Toggling active flag for user: {}", id);

        let result = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            r#"
            UPDATE users
            SET active = NOT active,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error toggling user {}: {}", id, e);
            AppError::Database(format!("Failed to toggle user: {}", e))
        })?;

        Ok(result.map(|row| row.into()))
    }

    #[instrument(skip(self))]
    async fn list_by_role(
        &self,
        role: UserRole,
        keyword: Option<&str>,
        field: EmployeeSearchField,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        debug!("Listing {} users, keyword {:?}", role, keyword);

        let keyword = contains_pattern(keyword);
        let where_clause = r#"
            WHERE role = $1
              AND ($2::TEXT IS NULL
                   OR ($3::TEXT = 'name' AND full_name ILIKE $2 ESCAPE '\')
                   OR ($3::TEXT = 'email' AND email ILIKE $2 ESCAPE '\')
                   OR ($3::TEXT = 'phone' AND phone_number ILIKE $2 ESCAPE '\')
                   OR ($3::TEXT = 'any' AND (full_name ILIKE $2 ESCAPE '\'
                                             OR email ILIKE $2 ESCAPE '\'
                                             OR phone_number ILIKE $2 ESCAPE '\')))
        "#;

        let total: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM users {}", where_clause))
                .bind(role.as_str())
                .bind(keyword.as_deref())
                .bind(field.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error counting users: {}", e);
                    AppError::Database(format!("Failed to count users: {}", e))
                })?;

        let rows = sqlx::query_as::<sqlx::Postgres, UserRow>(&format!(
            "SELECT {} FROM users {} ORDER BY id LIMIT $4 OFFSET $5",
            USER_COLUMNS, where_clause
        ))
        .bind(role.as_str())
        .bind(keyword.as_deref())
        .bind(field.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing users: {}", e);
            AppError::Database(format!("Failed to fetch users: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    full_name: String,
    email: String,
    phone_number: String,
    password_hash: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone_number: row.phone_number,
            password_hash: row.password_hash,
            role: PgUserRepository::parse_role(&row.role),
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
