//! # Database Persistence Layer
//!
//! Postgres persistence for portal state via SQLx.
//!
//! The database layer is optional. When `DATABASE_URL` is set, every write
//! is persisted before it is applied to the in-memory stores, and the
//! stores are hydrated from the database on startup. When absent, the API
//! runs in in-memory-only mode (development and tests).
//!
//! Queries are built at runtime with `sqlx::query`/`query_as`, so the crate
//! compiles without a live database.

pub mod documents;
pub mod legal_acts;
pub mod organizations;
pub mod rules;
pub mod sites;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            tracing::warn!(
                "DATABASE_URL not set: running in-memory only mode. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Build a decode error for a column holding an unknown enum value.
pub(crate) fn unknown_value(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unknown {column} value in database: '{value}'").into())
}

/// Whether `err` is a foreign key violation, e.g. an insert under a site
/// that has since been deleted.
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_foreign_key_violation(),
        _ => false,
    }
}
