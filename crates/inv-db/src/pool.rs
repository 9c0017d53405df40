//! Database connection pool management
//!
//! Provides PostgreSQL connection pooling using SQLx.

use inv_core::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::time::Duration;

/// Schema for the devices table, applied by [`Database::ensure_schema`]
pub const SCHEMA: &str = include_str!("../migrations/0001_create_devices.sql");

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = pool_options(config).connect(&config.url).await?;

        tracing::info!(
            max_connections = config.pool_size,
            min_connections = config.min_connections,
            "Database pool created"
        );

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the devices table and its indexes if missing
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        // Simple-query protocol, so the multi-statement script runs as one
        self.pool.execute(SCHEMA).await?;
        tracing::info!("Database schema ensured");
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .min_connections(config.min_connections.min(config.pool_size))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}
