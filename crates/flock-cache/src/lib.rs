//! # flock-cache
//!
//! Session storage for refresh tokens.
//!
//! - **Connection Pool**: managed Redis connection pool with deadpool
//! - **Sessions**: [`RedisSessionStore`] when Redis is configured,
//!   [`MemorySessionStore`] otherwise
//!
//! ## Example
//!
//! ```ignore
//! use flock_cache::{RedisPool, RedisSessionStore};
//!
//! let pool = RedisPool::from_config(&redis_config)?;
//! let sessions = RedisSessionStore::with_ttl(pool, 7 * 24 * 3600);
//! ```

pub mod pool;
pub mod session;

pub use pool::{RedisHealthProbe, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use session::{MemorySessionStore, RedisSessionStore};
