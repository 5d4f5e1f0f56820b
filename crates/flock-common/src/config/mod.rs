//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BootstrapAdmin, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, PushConfig, RateLimitConfig, RedisConfig, ServerConfig, SmsConfig, StorageConfig,
};
