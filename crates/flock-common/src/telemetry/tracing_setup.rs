//! Tracing and logging setup
//!
//! One subscriber for every binary: an `EnvFilter` (honouring `RUST_LOG`)
//! over either a human-readable or a JSON formatter.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::Registry,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::Environment;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the workspace crates when `RUST_LOG` is unset
    pub level: Level,
    /// Emit one JSON object per event
    pub json: bool,
    /// Log span open/close events
    pub span_events: bool,
    pub file_line: bool,
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            json: false,
            span_events: true,
            file_line: true,
            thread_names: true,
        }
    }

    #[must_use]
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            json: true,
            span_events: false,
            file_line: false,
            thread_names: false,
        }
    }

    /// Pick the preset matching the deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self::production()
        } else if env.is_development() {
            Self::development()
        } else {
            Self::default()
        }
    }

    /// Filter used when `RUST_LOG` is unset
    ///
    /// Workspace crates log at the configured level; noisy dependencies stay at warn.
    #[must_use]
    pub fn default_directives(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        format!(
            "warn,flock_api={level},flock_service={level},flock_db={level},flock_cache={level},flock_common={level},tower_http={level}"
        )
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directives()))
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let spans = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_file(self.file_line)
            .with_line_number(self.file_line)
            .with_thread_names(self.thread_names)
            .with_span_events(spans);

        if self.json {
            layer.json().with_current_span(true).boxed()
        } else {
            layer.boxed()
        }
    }
}

/// Install the global subscriber
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) {
    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(config.filter())
        .init();
}

/// Install the global subscriber unless one is already present
///
/// Safe to call from every test.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(config.filter())
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(TracingConfig::production().json);
        assert!(!TracingConfig::development().json);
        assert_eq!(TracingConfig::development().level, Level::DEBUG);
    }

    #[test]
    fn test_for_environment() {
        assert!(TracingConfig::for_environment(Environment::Production).json);
        assert_eq!(
            TracingConfig::for_environment(Environment::Development).level,
            Level::DEBUG
        );
        assert_eq!(TracingConfig::for_environment(Environment::Staging).level, Level::INFO);
    }

    #[test]
    fn test_default_directives_scope_workspace_crates() {
        let directives = TracingConfig::development().default_directives();
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("flock_service=debug"));
        assert!(directives.contains("tower_http=debug"));
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let config = TracingConfig::default();
        let _ = try_init_tracing(&config);
        assert!(try_init_tracing(&config).is_err());
    }
}
