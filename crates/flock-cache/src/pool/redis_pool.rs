//! Redis connection pool (deadpool-redis) and the JSON helpers the session
//! store is built on.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

use flock_common::RedisConfig;
use flock_core::error::DomainError;
use flock_core::traits::{HealthProbe, RepoResult};

/// Pool sizing for a Redis deployment
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// `redis://[user:password@]host:port[/db]`
    pub url: String,
    pub max_connections: usize,
}

impl From<&RedisConfig> for RedisPoolConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("invalid Redis pool settings: {0}")]
    Build(String),

    #[error("no Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("stored session is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Host part of a Redis URL, without credentials
fn redacted(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}

#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Build the pool; connections are opened lazily on first use
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        tracing::info!(
            url = %redacted(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );
        Ok(Self { pool })
    }

    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    pub async fn ping(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Store `value` as JSON, expiring after `ttl_seconds`
    pub async fn set_json<V: Serialize>(&self, key: &str, value: &V, ttl_seconds: u64) -> RedisResult<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.get().await?;
        conn.set_ex::<_, _, ()>(key, json, ttl_seconds).await?;
        Ok(())
    }

    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.get().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(RedisPoolError::from)
    }

    /// Delete keys, returning how many existed
    pub async fn delete(&self, keys: &[String]) -> RedisResult<u32> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get().await?;
        Ok(conn.del(keys).await?)
    }
}

/// Readiness probe issuing `PING`
#[derive(Clone)]
pub struct RedisHealthProbe {
    pool: RedisPool,
}

impl RedisHealthProbe {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for RedisHealthProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> RepoResult<()> {
        self.pool.ping().await.map_err(DomainError::from)
    }
}
