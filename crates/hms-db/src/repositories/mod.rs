//! Repository implementations
//!
//! This module contains concrete implementations of all repository traits
//! defined in hms-core, using sqlx for PostgreSQL access.

pub mod booking_repo;
pub mod rating_repo;
pub mod service_repo;
pub mod token_repo;
pub mod user_repo;

#[cfg(test)]
mod test_db;

pub use booking_repo::PgBookingRepository;
pub use rating_repo::PgRatingRepository;
pub use service_repo::PgServiceRepository;
pub use token_repo::PgRevokedTokenRepository;
pub use user_repo::PgUserRepository;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Name of the unique constraint a database error violated, if any
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() != Some(UNIQUE_VIOLATION) {
        return None;
    }
    Some(db_err.constraint().unwrap_or_default().to_string())
}

/// ILIKE pattern matching `keyword` literally anywhere in a column
///
/// `%`, `_` and `\` in the keyword are escaped; use with `ESCAPE '\'`.
/// Blank keywords yield `None` so the filter is skipped.
pub(crate) fn contains_pattern(keyword: Option<&str>) -> Option<String> {
    keyword.filter(|k| !k.is_empty()).map(|k| {
        let escaped = k
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}
