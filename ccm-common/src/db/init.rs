//! Database initialization
//!
//! Opens (or creates) the catalog database and brings the schema up to date.
//! All `CREATE TABLE` statements are idempotent, so calling this on every
//! startup is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc creates the database file on first run
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers while a write is in flight, which keeps
    // live observers responsive during store writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_courses_table(&pool).await?;
    create_categories_table(&pool).await?;

    Ok(pool)
}

/// Create the courses table
///
/// Timestamps are epoch milliseconds; `updated_at` is NULL until the first
/// edit. `category_id` holds the category display name (see the categories
/// table note).
pub async fn create_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id TEXT NOT NULL,
            lessons INTEGER NOT NULL,
            score INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER,
            CHECK (lessons > 0),
            CHECK (score >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_created_at ON courses(created_at)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_category ON courses(category_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the categories cache table
///
/// Rows are only ever written in bulk after a successful remote fetch.
/// `id` and `name` carry the same value in the deployed policy; both columns
/// are kept so a future surrogate key does not need a schema change.
pub async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            fetched_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name)")
        .execute(pool)
        .await?;

    Ok(())
}
