//! PostgreSQL pool lifecycle: connect, migrate, check and drain.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use twoem_core::config::database::DatabaseConfig;
use twoem_core::{AppError, AppResult, ErrorCode};

/// The portal's PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connects, applies pending migrations and checks the server answers.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Self::connect(config).await?;
        db.migrate().await?;
        let version = db.server_version().await?;
        info!(server = %version, "PostgreSQL ready");
        Ok(db)
    }

    /// Opens the pool without touching the schema.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        Ok(Self { pool })
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| db_error("Failed to run migrations", e))?;
        info!("Schema is up to date");
        Ok(())
    }

    /// Round-trips a query and returns the server's version string.
    pub async fn server_version(&self) -> AppResult<String> {
        sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Database version query failed", e))
    }

    /// The underlying sqlx pool, for the repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Closes the pool, giving in-flight queries up to `grace` to finish.
    pub async fn close_within(&self, grace: Duration) {
        if tokio::time::timeout(grace, self.pool.close()).await.is_err() {
            warn!(grace_seconds = grace.as_secs(), "Database pool did not drain in time");
        } else {
            info!("Database pool closed");
        }
    }
}

fn db_error(context: &str, err: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::with_source(ErrorCode::Database, format!("{context}: {err}"), err)
}

/// Hides the password of a connection URL for logging.
fn mask_password(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url.rfind('@') {
        Some(at) if at > scheme_end => match url[scheme_end..at].find(':') {
            Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
            None => url.to_string(),
        },
        _ => url.to_string(),
    }
}
