//! Service context - dependency container for services
//!
//! Holds every repository, the session store, outbound delivery channels and
//! the permission gate. Storage calls go through [`ServiceContext::storage`],
//! which bounds them with the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use flock_common::auth::JwtService;
use flock_common::AppConfig;
use flock_core::traits::{
    AssignmentRepository, DutyRepository, GroupRepository, HealthProbe, MemberRepository,
    PushSubscriptionRepository, RepoResult, ReportRepository, SessionStore, SmsLogRepository,
    TerritoryRepository,
};
use flock_core::DomainError;

use crate::delivery::{LoggingSmsGateway, PushDelivery, SmsGateway};
use crate::gate::PermissionGate;

use super::error::{ServiceError, ServiceResult};

/// Tunables shared by all services
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Upper bound on a single storage call
    pub storage_timeout: Duration,
    /// Cap on the member map result
    pub location_limit: i64,
    /// Parallel push deliveries per fan-out
    pub push_concurrency: usize,
    /// Base64url VAPID public key handed to browsers
    pub vapid_public_key: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(5),
            location_limit: 2000,
            push_concurrency: 8,
            vapid_public_key: None,
        }
    }
}

impl ServiceSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            storage_timeout: Duration::from_secs(config.storage.timeout_secs),
            location_limit: config.storage.location_limit,
            push_concurrency: config.push.concurrency.max(1),
            vapid_public_key: config
                .push
                .is_enabled()
                .then(|| config.push.vapid_public_key.clone())
                .flatten(),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    member_repo: Arc<dyn MemberRepository>,
    group_repo: Arc<dyn GroupRepository>,
    territory_repo: Arc<dyn TerritoryRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    duty_repo: Arc<dyn DutyRepository>,
    report_repo: Arc<dyn ReportRepository>,
    subscription_repo: Arc<dyn PushSubscriptionRepository>,
    sms_log_repo: Arc<dyn SmsLogRepository>,

    // Sessions
    session_store: Arc<dyn SessionStore>,

    // Outbound
    push_delivery: Option<Arc<dyn PushDelivery>>,
    sms_gateway: Arc<dyn SmsGateway>,

    // Readiness
    health_probes: Vec<Arc<dyn HealthProbe>>,

    jwt_service: Arc<JwtService>,
    gate: Arc<PermissionGate>,
    settings: ServiceSettings,
}

impl ServiceContext {
    // === Repositories ===

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn group_repo(&self) -> &dyn GroupRepository {
        self.group_repo.as_ref()
    }

    pub fn territory_repo(&self) -> &dyn TerritoryRepository {
        self.territory_repo.as_ref()
    }

    pub fn assignment_repo(&self) -> &dyn AssignmentRepository {
        self.assignment_repo.as_ref()
    }

    pub fn duty_repo(&self) -> &dyn DutyRepository {
        self.duty_repo.as_ref()
    }

    pub fn report_repo(&self) -> &dyn ReportRepository {
        self.report_repo.as_ref()
    }

    pub fn subscription_repo(&self) -> &dyn PushSubscriptionRepository {
        self.subscription_repo.as_ref()
    }

    pub fn sms_log_repo(&self) -> &dyn SmsLogRepository {
        self.sms_log_repo.as_ref()
    }

    // === Sessions / outbound ===

    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    /// Push delivery, if VAPID keys are configured
    pub fn push_delivery(&self) -> Option<&dyn PushDelivery> {
        self.push_delivery.as_deref()
    }

    pub fn sms_gateway(&self) -> &dyn SmsGateway {
        self.sms_gateway.as_ref()
    }

    pub fn health_probes(&self) -> &[Arc<dyn HealthProbe>] {
        &self.health_probes
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn gate(&self) -> &PermissionGate {
        self.gate.as_ref()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Run a storage call under the storage timeout
    ///
    /// Storage failures and timeouts are logged here with the underlying
    /// cause; callers only see the classified error.
    pub async fn storage<T, F>(&self, call: F) -> ServiceResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        let timeout = self.settings.storage_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if err.is_data_access() {
                    error!(error = %err, "Storage call failed");
                }
                Err(ServiceError::from(err))
            }
            Err(_) => {
                error!(timeout_secs = timeout.as_secs(), "Storage call timed out");
                Err(DomainError::StorageTimeout(timeout.as_secs()).into())
            }
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("push_enabled", &self.push_delivery.is_some())
            .field("health_probes", &self.health_probes.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    member_repo: Option<Arc<dyn MemberRepository>>,
    group_repo: Option<Arc<dyn GroupRepository>>,
    territory_repo: Option<Arc<dyn TerritoryRepository>>,
    assignment_repo: Option<Arc<dyn AssignmentRepository>>,
    duty_repo: Option<Arc<dyn DutyRepository>>,
    report_repo: Option<Arc<dyn ReportRepository>>,
    subscription_repo: Option<Arc<dyn PushSubscriptionRepository>>,
    sms_log_repo: Option<Arc<dyn SmsLogRepository>>,
    session_store: Option<Arc<dyn SessionStore>>,
    push_delivery: Option<Arc<dyn PushDelivery>>,
    sms_gateway: Option<Arc<dyn SmsGateway>>,
    health_probes: Vec<Arc<dyn HealthProbe>>,
    jwt_service: Option<Arc<JwtService>>,
    gate: Option<PermissionGate>,
    settings: Option<ServiceSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one backend for every repository
    pub fn repositories<S>(self, store: Arc<S>) -> Self
    where
        S: MemberRepository
            + GroupRepository
            + TerritoryRepository
            + AssignmentRepository
            + DutyRepository
            + ReportRepository
            + PushSubscriptionRepository
            + SmsLogRepository
            + 'static,
    {
        self.member_repo(store.clone())
            .group_repo(store.clone())
            .territory_repo(store.clone())
            .assignment_repo(store.clone())
            .duty_repo(store.clone())
            .report_repo(store.clone())
            .subscription_repo(store.clone())
            .sms_log_repo(store)
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn group_repo(mut self, repo: Arc<dyn GroupRepository>) -> Self {
        self.group_repo = Some(repo);
        self
    }

    pub fn territory_repo(mut self, repo: Arc<dyn TerritoryRepository>) -> Self {
        self.territory_repo = Some(repo);
        self
    }

    pub fn assignment_repo(mut self, repo: Arc<dyn AssignmentRepository>) -> Self {
        self.assignment_repo = Some(repo);
        self
    }

    pub fn duty_repo(mut self, repo: Arc<dyn DutyRepository>) -> Self {
        self.duty_repo = Some(repo);
        self
    }

    pub fn report_repo(mut self, repo: Arc<dyn ReportRepository>) -> Self {
        self.report_repo = Some(repo);
        self
    }

    pub fn subscription_repo(mut self, repo: Arc<dyn PushSubscriptionRepository>) -> Self {
        self.subscription_repo = Some(repo);
        self
    }

    pub fn sms_log_repo(mut self, repo: Arc<dyn SmsLogRepository>) -> Self {
        self.sms_log_repo = Some(repo);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn push_delivery(mut self, delivery: Arc<dyn PushDelivery>) -> Self {
        self.push_delivery = Some(delivery);
        self
    }

    pub fn sms_gateway(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.sms_gateway = Some(gateway);
        self
    }

    pub fn health_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.health_probes.push(probe);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn gate(mut self, gate: PermissionGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            member_repo: self
                .member_repo
                .ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            group_repo: self
                .group_repo
                .ok_or_else(|| ServiceError::validation("group_repo is required"))?,
            territory_repo: self
                .territory_repo
                .ok_or_else(|| ServiceError::validation("territory_repo is required"))?,
            assignment_repo: self
                .assignment_repo
                .ok_or_else(|| ServiceError::validation("assignment_repo is required"))?,
            duty_repo: self
                .duty_repo
                .ok_or_else(|| ServiceError::validation("duty_repo is required"))?,
            report_repo: self
                .report_repo
                .ok_or_else(|| ServiceError::validation("report_repo is required"))?,
            subscription_repo: self
                .subscription_repo
                .ok_or_else(|| ServiceError::validation("subscription_repo is required"))?,
            sms_log_repo: self
                .sms_log_repo
                .ok_or_else(|| ServiceError::validation("sms_log_repo is required"))?,
            session_store: self
                .session_store
                .ok_or_else(|| ServiceError::validation("session_store is required"))?,
            push_delivery: self.push_delivery,
            sms_gateway: self
                .sms_gateway
                .unwrap_or_else(|| Arc::new(LoggingSmsGateway)),
            health_probes: self.health_probes,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            gate: Arc::new(self.gate.unwrap_or_default()),
            settings: self.settings.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_with;
    use flock_db::MemoryStore;

    #[test]
    fn test_builder_requires_repositories() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("member_repo")));
    }

    #[tokio::test]
    async fn test_storage_timeout_maps_to_data_access() {
        let store = Arc::new(MemoryStore::new());
        store.set_latency(Duration::from_millis(200));
        let ctx = context_with(store.clone(), |settings| {
            settings.storage_timeout = Duration::from_millis(20);
        });

        let err = ctx
            .storage(ctx.member_repo().find_with_location(10))
            .await
            .unwrap_err();
        assert!(err.is_data_access());
        assert!(matches!(err, ServiceError::Domain(DomainError::StorageTimeout(_))));
    }

    #[tokio::test]
    async fn test_storage_passes_results_through() {
        let store = Arc::new(MemoryStore::new());
        let ctx = context_with(store, |_| {});
        let located = ctx
            .storage(ctx.member_repo().find_with_location(10))
            .await
            .unwrap();
        assert!(located.is_empty());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::with_defaults("postgres://db/flock", "secret");
        config.storage.timeout_secs = 3;
        config.push.vapid_public_key = Some("pub".to_string());
        config.push.vapid_private_key = None;
        let settings = ServiceSettings::from_config(&config);
        assert_eq!(settings.storage_timeout, Duration::from_secs(3));
        // Half-configured VAPID keys disable push entirely
        assert_eq!(settings.vapid_public_key, None);
    }
}
