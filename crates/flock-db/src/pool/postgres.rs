//! PostgreSQL connection pool and schema migrations

use async_trait::async_trait;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::PathBuf;
use std::time::Duration;

use flock_core::error::DomainError;
use flock_core::traits::{HealthProbe, RepoResult};

/// Overrides the compiled-in migrations directory (for packaged deployments)
pub const MIGRATIONS_DIR_ENV: &str = "FLOCK_MIGRATIONS_DIR";

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Maximum time to wait for a free connection
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl From<&flock_common::DatabaseConfig> for PoolSettings {
    fn from(config: &flock_common::DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Self::new(config.url.clone())
        }
    }
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .connect(&settings.url)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "PostgreSQL pool created"
    );
    Ok(pool)
}

/// Directory holding the `.sql` migrations
pub fn migrations_dir() -> PathBuf {
    std::env::var_os(MIGRATIONS_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations")))
}

/// Apply any pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    let dir = migrations_dir();
    let migrator = Migrator::new(dir.as_path()).await?;
    migrator.run(pool).await?;
    tracing::info!(dir = %dir.display(), "Database migrations applied");
    Ok(())
}

/// Readiness probe issuing `SELECT 1`
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: PgPool,
}

impl PgHealthProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let mut config = flock_common::AppConfig::with_defaults("postgres://db/flock", "s").database;
        config.max_connections = 42;
        let settings = PoolSettings::from(&config);
        assert_eq!(settings.url, "postgres://db/flock");
        assert_eq!(settings.max_connections, 42);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_migrations_dir_has_sql() {
        let dir = migrations_dir();
        let count = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "sql"))
            .count();
        assert!(count >= 4, "expected migrations in {}", dir.display());
    }
}
