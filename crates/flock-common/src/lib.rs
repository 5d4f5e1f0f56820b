//! # flock-common
//!
//! Shared utilities including configuration, error handling, authentication,
//! VAPID key material, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod vapid;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password, Claims,
    JwtService, TokenPair, TokenType,
};
pub use config::{
    AppConfig, AppSettings, BootstrapAdmin, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, PushConfig, RateLimitConfig, RedisConfig, ServerConfig, SmsConfig, StorageConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
pub use vapid::{VapidError, VapidKeyPair};
