//! Server Configuration
//!
//! Configuration comes from environment variables with local-development
//! defaults. A missing or unreachable database is not fatal: the server
//! falls back to in-memory repositories so the conversation engine stays
//! usable, which is also the configuration the test suite runs against.

use sqlx::PgPool;
use std::time::Duration;

use crate::backend::conversation::store::DEFAULT_STORAGE_TIMEOUT_MS;

/// Load and initialize the database connection pool.
///
/// Reads `DATABASE_URL`, connects, and runs migrations. Returns `None` when
/// the variable is unset or the connection fails; errors are logged but do
/// not prevent startup.
pub async fn load_database() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");
            return None;
        }
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory storage");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed"),
        Err(e) => {
            // Migrations may already be applied; keep going.
            tracing::error!("Failed to run database migrations: {:?}", e);
            tracing::warn!("Continuing - database might not be up to date");
        }
    }

    Some(pool)
}

/// Port to bind, from `SERVER_PORT` (default 3000).
pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3000)
}

/// Bound on a single storage operation, from `STORAGE_TIMEOUT_MS`.
pub fn storage_timeout() -> Duration {
    let millis = std::env::var("STORAGE_TIMEOUT_MS")
        .ok()
        .and_then(|ms| ms.parse().ok())
        .unwrap_or(DEFAULT_STORAGE_TIMEOUT_MS);
    Duration::from_millis(millis)
}
