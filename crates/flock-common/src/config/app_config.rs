//! Application configuration structs
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first when present). Optional subsystems such as Redis, Web Push and the
//! SMS gateway are switched off when their variables are absent.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    /// Refresh sessions fall back to process memory when unset
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub push: PushConfig,
    pub sms: SmsConfig,
    pub bootstrap: Option<BootstrapAdmin>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Storage access limits
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Upper bound on a single storage call, in seconds
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum rows returned by the member location query
    #[serde(default = "default_location_limit")]
    pub location_limit: i64,
}

/// Web Push (VAPID) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// base64url uncompressed P-256 point
    pub vapid_public_key: Option<String>,
    /// base64url 32-byte scalar
    pub vapid_private_key: Option<String>,
    /// `mailto:` or `https:` contact for push services
    #[serde(default = "default_vapid_subject")]
    pub vapid_subject: String,
    /// Push message lifetime at the push service, in seconds
    #[serde(default = "default_push_ttl")]
    pub ttl_secs: u32,
    /// Deliveries in flight at once during a fan-out
    #[serde(default = "default_push_concurrency")]
    pub concurrency: usize,
}

impl PushConfig {
    /// Both halves of the VAPID keypair are configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.vapid_public_key.is_some() && self.vapid_private_key.is_some()
    }
}

/// Outbound SMS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    /// HTTP endpoint accepting `{to, body}`; messages are only logged when unset
    pub gateway_url: Option<String>,
    pub api_token: Option<String>,
    #[serde(default = "default_sms_sender")]
    pub sender_name: String,
}

/// Initial administrator created at startup
#[derive(Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub full_name: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

// Default value functions
fn default_app_name() -> String {
    "flock".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_storage_timeout_secs() -> u64 {
    5
}

fn default_location_limit() -> i64 {
    2000
}

fn default_vapid_subject() -> String {
    "mailto:admin@localhost".to_string()
}

fn default_push_ttl() -> u32 {
    86_400
}

fn default_push_concurrency() -> usize {
    8
}

fn default_sms_sender() -> String {
    "Flock".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Read an optional variable; empty values count as unset
fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a required variable
fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

/// Parse an optional variable, falling back to `default` when unset
fn parsed_or<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default()),
    }
}

impl AppConfig {
    /// Configuration with every optional setting at its default
    ///
    /// Redis, Web Push, SMS delivery and the bootstrap admin are disabled.
    #[must_use]
    pub fn with_defaults(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            api: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            database: DatabaseConfig {
                url: database_url.into(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                run_migrations: true,
            },
            redis: None,
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                access_token_expiry: default_access_token_expiry(),
                refresh_token_expiry: default_refresh_token_expiry(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            storage: StorageConfig {
                timeout_secs: default_storage_timeout_secs(),
                location_limit: default_location_limit(),
            },
            push: PushConfig {
                vapid_public_key: None,
                vapid_private_key: None,
                vapid_subject: default_vapid_subject(),
                ttl_secs: default_push_ttl(),
                concurrency: default_push_concurrency(),
            },
            sms: SmsConfig {
                gateway_url: None,
                api_token: None,
                sender_name: default_sms_sender(),
            },
            bootstrap: None,
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::with_defaults(required("DATABASE_URL")?, required("JWT_SECRET")?);

        config.app.name = optional("APP_NAME").unwrap_or_else(default_app_name);
        if let Some(raw) = optional("APP_ENV") {
            config.app.env =
                Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?;
        }

        config.api.host = optional("API_HOST").unwrap_or_else(default_host);
        config.api.port = parsed_or("API_PORT", default_port)?;

        config.database.max_connections =
            parsed_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?;
        config.database.min_connections =
            parsed_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?;
        config.database.run_migrations = parsed_or("DATABASE_RUN_MIGRATIONS", default_true)?;

        config.redis = match optional("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parsed_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            }),
            None => None,
        };

        config.jwt.access_token_expiry =
            parsed_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?;
        config.jwt.refresh_token_expiry =
            parsed_or("JWT_REFRESH_TOKEN_EXPIRY", default_refresh_token_expiry)?;

        config.rate_limit.requests_per_second =
            parsed_or("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?;
        config.rate_limit.burst = parsed_or("RATE_LIMIT_BURST", default_burst)?;

        config.cors.allowed_origins = optional("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        config.storage.timeout_secs =
            parsed_or("STORAGE_TIMEOUT_SECS", default_storage_timeout_secs)?;
        config.storage.location_limit =
            parsed_or("MEMBER_LOCATION_LIMIT", default_location_limit)?;
        if config.storage.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("STORAGE_TIMEOUT_SECS", "0".to_string()));
        }

        config.push.vapid_public_key = optional("VAPID_PUBLIC_KEY");
        config.push.vapid_private_key = optional("VAPID_PRIVATE_KEY");
        config.push.vapid_subject = optional("VAPID_SUBJECT").unwrap_or_else(default_vapid_subject);
        config.push.ttl_secs = parsed_or("PUSH_TTL_SECS", default_push_ttl)?;
        config.push.concurrency = parsed_or("PUSH_CONCURRENCY", default_push_concurrency)?.max(1);
        if config.push.vapid_public_key.is_some() != config.push.vapid_private_key.is_some() {
            return Err(ConfigError::InvalidValue(
                "VAPID_PRIVATE_KEY",
                "VAPID_PUBLIC_KEY and VAPID_PRIVATE_KEY must be set together".to_string(),
            ));
        }

        config.sms.gateway_url = optional("SMS_GATEWAY_URL");
        config.sms.api_token = optional("SMS_API_TOKEN");
        config.sms.sender_name = optional("SMS_SENDER_NAME").unwrap_or_else(default_sms_sender);

        config.bootstrap = match (
            optional("BOOTSTRAP_ADMIN_EMAIL"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                full_name: optional("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(default_admin_name),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::MissingVar("BOOTSTRAP_ADMIN_PASSWORD")),
        };

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("Production"), Some(Environment::Production));
        assert_eq!(Environment::parse("dev"), Some(Environment::Development));
        assert_eq!(Environment::parse("qa"), None);
        assert!(Environment::Production.is_production());
        assert!(Environment::Development.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_with_defaults() {
        let config = AppConfig::with_defaults("postgres://localhost/flock", "secret");
        assert_eq!(config.app.name, "flock");
        assert_eq!(config.storage.timeout_secs, 5);
        assert_eq!(config.storage.location_limit, 2000);
        assert_eq!(config.jwt.access_token_expiry, 900);
        assert!(config.redis.is_none());
        assert!(!config.push.is_enabled());
        assert!(config.sms.gateway_url.is_none());
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_bootstrap_debug_hides_password() {
        let admin = BootstrapAdmin {
            email: "admin@example.org".to_string(),
            password: "hunter2-hunter2".to_string(),
            full_name: default_admin_name(),
        };
        let debug = format!("{admin:?}");
        assert!(debug.contains("admin@example.org"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_parsed_or_rejects_garbage() {
        // Variable names unique to this test to avoid clashing with the environment
        env::set_var("FLOCK_TEST_PARSED_OR", "not-a-number");
        let result: Result<u64, _> = parsed_or("FLOCK_TEST_PARSED_OR", || 1);
        assert!(matches!(result, Err(ConfigError::InvalidValue("FLOCK_TEST_PARSED_OR", _))));

        env::set_var("FLOCK_TEST_PARSED_OR", " 42 ");
        assert_eq!(parsed_or::<u64>("FLOCK_TEST_PARSED_OR", || 1).unwrap(), 42);

        env::remove_var("FLOCK_TEST_PARSED_OR");
        assert_eq!(parsed_or::<u64>("FLOCK_TEST_PARSED_OR", || 7).unwrap(), 7);
    }
}
