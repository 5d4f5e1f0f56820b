//! Redis connection pool module.

mod redis_pool;

pub use redis_pool::{RedisHealthProbe, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
