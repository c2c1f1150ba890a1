//! Postgres persistence for the Procura platform.
//!
//! Row models (`FromRow` structs plus `Create*` DTOs) live in [`models`];
//! CRUD access goes through the unit-struct repositories in
//! [`repositories`]. Aggregate-valued columns (approval chain, workflow
//! history, triggers, documents, items) are stored as JSONB via
//! [`sqlx::types::Json`] wrapping the `procura-core` types.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity check used at startup.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
