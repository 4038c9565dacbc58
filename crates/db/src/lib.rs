//! PostgreSQL backing for the user directory.

pub mod models;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;
use userdir_core::error::CoreError;

pub use store::PgDirectoryStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a sqlx error onto the domain error taxonomy.
///
/// Unique violations (SQLSTATE `23505`) on a `uq_` constraint become
/// [`CoreError::DuplicateEmail`], check violations (`23514`) become
/// [`CoreError::Validation`]; everything else is internal.
pub fn map_db_error(err: sqlx::Error, email: Option<&str>) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("");
        match db_err.code().as_deref() {
            Some("23505") if constraint.starts_with("uq_") => {
                return CoreError::DuplicateEmail(email.unwrap_or(constraint).to_string());
            }
            Some("23514") => {
                return CoreError::Validation(format!("value violates check constraint {constraint}"));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(err.to_string())
}
