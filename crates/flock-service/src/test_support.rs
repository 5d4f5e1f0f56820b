//! Shared fixtures for service tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use flock_cache::MemorySessionStore;
use flock_common::auth::{hash_password, JwtService};
use flock_core::entities::{Member, PushSubscription};
use flock_core::value_objects::{MemberId, Role};
use flock_db::MemoryStore;

use crate::delivery::{DeliveryError, PushDelivery, PushMessage, SmsError, SmsGateway};
use crate::gate::Actor;
use crate::services::{ServiceContext, ServiceContextBuilder, ServiceSettings};

pub struct TestEnv {
    pub store: Arc<MemoryStore>,
    pub ctx: ServiceContext,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    pub fn with_settings(configure: impl FnOnce(&mut ServiceSettings)) -> Self {
        let store = Arc::new(MemoryStore::new());
        let ctx = context_with(store.clone(), configure);
        Self { store, ctx }
    }

    pub fn with_push(push: Arc<FakePush>) -> Self {
        Self::with_store_and_push(Arc::new(MemoryStore::new()), push)
    }

    pub fn with_store_and_push(store: Arc<MemoryStore>, push: Arc<FakePush>) -> Self {
        let ctx = builder(store.clone())
            .push_delivery(push)
            .build()
            .expect("test context");
        Self { store, ctx }
    }

    pub fn with_sms(sms: Arc<FakeSms>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let ctx = builder(store.clone())
            .sms_gateway(sms)
            .build()
            .expect("test context");
        Self { store, ctx }
    }

    /// Context whose only health probe is the store itself
    pub fn with_probe(store: Arc<MemoryStore>) -> Self {
        let ctx = builder(store.clone())
            .health_probe(store.clone())
            .build()
            .expect("test context");
        Self { store, ctx }
    }
}

fn builder(store: Arc<MemoryStore>) -> ServiceContextBuilder {
    ServiceContextBuilder::new()
        .repositories(store)
        .session_store(Arc::new(MemorySessionStore::new(Duration::from_secs(3600))))
        .jwt_service(Arc::new(JwtService::new(
            "service-test-secret-that-is-long-enough",
            900,
            3600,
        )))
}

/// Context over an in-memory store with adjusted settings
pub fn context_with(
    store: Arc<MemoryStore>,
    configure: impl FnOnce(&mut ServiceSettings),
) -> ServiceContext {
    let mut settings = ServiceSettings::default();
    configure(&mut settings);
    builder(store)
        .settings(settings)
        .build()
        .expect("test context")
}

pub fn seed_member(env: &TestEnv, name: &str, role: Role) -> Member {
    let mut member = Member::new(MemberId::new(), name.to_string());
    member.role = role;
    env.store.seed_member(member.clone(), None);
    member
}

pub fn seed_member_with_phone(env: &TestEnv, name: &str, phone: &str) -> Member {
    let mut member = Member::new(MemberId::new(), name.to_string());
    member.phone = Some(phone.to_string());
    env.store.seed_member(member.clone(), None);
    member
}

pub fn seed_login(env: &TestEnv, name: &str, role: Role, email: &str, password: &str) -> Member {
    let mut member = Member::new(MemberId::new(), name.to_string());
    member.role = role;
    member.email = Some(email.to_string());
    let hash = hash_password(password).expect("hash");
    env.store.seed_member(member.clone(), Some(hash));
    member
}

pub fn actor_for(member: &Member) -> Actor {
    Actor::from(member)
}

/// Push backend that fails for one endpoint and counts attempts
#[derive(Default)]
pub struct FakePush {
    failing_endpoint: Option<String>,
    /// Store taken offline while delivering
    outage: Option<Arc<MemoryStore>>,
    attempts: AtomicUsize,
}

impl FakePush {
    pub fn failing_for(endpoint: &str) -> Self {
        Self {
            failing_endpoint: Some(endpoint.to_string()),
            ..Self::default()
        }
    }

    pub fn outage_during_delivery(store: Arc<MemoryStore>) -> Self {
        Self {
            outage: Some(store),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushDelivery for FakePush {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        _message: &PushMessage,
    ) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(store) = &self.outage {
            store.set_unavailable(true);
        }
        if self.failing_endpoint.as_deref() == Some(subscription.endpoint.as_str()) {
            return Err(DeliveryError::Gone(410));
        }
        Ok(())
    }
}

/// SMS gateway that records what it was asked to send
#[derive(Default)]
pub struct FakeSms {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeSms {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SmsGateway for FakeSms {
    async fn send(&self, phone: &str, message: &str) -> Result<(), SmsError> {
        if self.fail {
            return Err(SmsError::Rejected(503));
        }
        self.sent.lock().push((phone.to_string(), message.to_string()));
        Ok(())
    }
}
