//! Server setup and initialization
//!
//! Wires storage, sessions and delivery into a [`ServiceContext`], builds the
//! router and runs it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use flock_cache::{MemorySessionStore, RedisHealthProbe, RedisPool, RedisSessionStore};
use flock_common::{AppConfig, AppError, JwtService};
use flock_db::{
    create_pool, run_migrations, PgAssignmentRepository, PgDutyRepository, PgGroupRepository,
    PgHealthProbe, PgMemberRepository, PgPushSubscriptionRepository, PgReportRepository,
    PgSmsLogRepository, PgTerritoryRepository, PoolSettings,
};
use flock_service::delivery::{gateway_from_config, WebPushDelivery};
use flock_service::services::AuthService;
use flock_service::{ServiceContext, ServiceContextBuilder, ServiceSettings};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// Health probes are mounted outside the rate limiter.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;
    let health = apply_middleware(health_routes());

    Ok(Router::new().merge(api).merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolSettings::from(&config.database))
        .await
        .map_err(|e| AppError::DataAccess(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::DataAccess(format!("migrations failed: {e}")))?;
        info!("Database migrations applied");
    }

    let session_ttl = u64::try_from(config.jwt.refresh_token_expiry)
        .map_err(|_| AppError::Config("refresh token expiry must not be negative".to_string()))?;

    let mut builder = ServiceContextBuilder::new()
        .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
        .group_repo(Arc::new(PgGroupRepository::new(pool.clone())))
        .territory_repo(Arc::new(PgTerritoryRepository::new(pool.clone())))
        .assignment_repo(Arc::new(PgAssignmentRepository::new(pool.clone())))
        .duty_repo(Arc::new(PgDutyRepository::new(pool.clone())))
        .report_repo(Arc::new(PgReportRepository::new(pool.clone())))
        .subscription_repo(Arc::new(PgPushSubscriptionRepository::new(pool.clone())))
        .sms_log_repo(Arc::new(PgSmsLogRepository::new(pool.clone())))
        .health_probe(Arc::new(PgHealthProbe::new(pool)))
        .jwt_service(Arc::new(JwtService::from_config(&config.jwt)))
        .sms_gateway(gateway_from_config(&config.sms))
        .settings(ServiceSettings::from_config(&config));

    builder = match &config.redis {
        Some(redis_config) => {
            info!("Connecting to Redis...");
            let redis = RedisPool::from_config(redis_config)
                .map_err(|e| AppError::Cache(e.to_string()))?;
            builder
                .health_probe(Arc::new(RedisHealthProbe::new(redis.clone())))
                .session_store(Arc::new(RedisSessionStore::with_ttl(redis, session_ttl)))
        }
        None => {
            warn!("REDIS_URL not set; sessions are kept in process memory");
            builder.session_store(Arc::new(MemorySessionStore::new(Duration::from_secs(
                session_ttl,
            ))))
        }
    };

    match WebPushDelivery::from_config(&config.push)
        .map_err(|e| AppError::Config(format!("invalid VAPID keys: {e}")))?
    {
        Some(delivery) => builder = builder.push_delivery(Arc::new(delivery)),
        None => warn!("VAPID keys not configured; push notifications are disabled"),
    }

    let service_context = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    bootstrap(&service_context, &config).await?;

    Ok(AppState::new(service_context, config))
}

/// Create the first administrator when configured and absent
async fn bootstrap(ctx: &ServiceContext, config: &AppConfig) -> Result<(), AppError> {
    let Some(admin) = &config.bootstrap else {
        return Ok(());
    };
    if AuthService::new(ctx).bootstrap_admin(admin).await? {
        info!(email = %admin.email, "Bootstrap administrator created");
    }
    Ok(())
}

/// Run the HTTP server until Ctrl-C
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid listen address: {e}")))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}
