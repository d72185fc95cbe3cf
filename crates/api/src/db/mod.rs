//! Database access for the MoonCart `PostgreSQL` schema.
//!
//! # Tables
//!
//! - `users` - accounts and Argon2id password hashes
//! - `categories`, `products` - catalog
//! - `cart_items` - per-user carts with add-time snapshots
//! - `orders`, `order_items` - orders and their line items
//! - `addresses` - saved shipping addresses
//! - `delivery_men` - courier roster
//! - `contact_messages`, `product_requests` - inbound submissions
//! - `tower_sessions.session` - session storage
//!
//! # Migrations
//!
//! Versioned SQL migrations live in `crates/api/migrations/` and are run
//! before the service starts:
//!
//! ```bash
//! cargo run -p mooncart-cli -- migrate
//! ```
//!
//! The server refuses to boot against a database that is missing the newest
//! migration - there is no runtime schema patching.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod cart;
pub mod categories;
pub mod delivery_men;
pub mod orders;
pub mod products;
pub mod support;
pub mod users;

/// Embedded migrations from `crates/api/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict` with a caller-supplied
/// message, passing every other error through as `Database`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Error from the startup schema check.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("database has never been migrated; run `mooncart-cli migrate`")]
    NotMigrated,
    #[error("database schema is at migration {applied}, expected {latest}; run `mooncart-cli migrate`")]
    Outdated { applied: i64, latest: i64 },
    #[error("schema check failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Verify that the newest embedded migration has been applied.
///
/// The schema is a deploy-time contract: migrations run via the CLI before
/// the service starts, and the server refuses to boot against anything
/// older.
///
/// # Errors
///
/// Returns `SchemaError` if the migrations table is absent or behind.
pub async fn verify_schema(pool: &PgPool) -> Result<(), SchemaError> {
    let latest = MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0);

    let applied: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
            .fetch_one(pool)
            .await
            .map_err(|_| SchemaError::NotMigrated)?;

    match applied {
        Some(applied) if applied >= latest => Ok(()),
        Some(applied) => Err(SchemaError::Outdated { applied, latest }),
        None => Err(SchemaError::NotMigrated),
    }
}
