//! Test helpers for integration tests
//!
//! Provides the in-process test server, HTTP request shortcuts and
//! response assertions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use flock_api::{create_app, AppState};
use flock_cache::MemorySessionStore;
use flock_common::{hash_password, AppConfig, JwtService, VapidKeyPair};
use flock_core::entities::{Member, PushSubscription};
use flock_core::value_objects::{GeoLocation, MemberId, Role};
use flock_db::MemoryStore;
use flock_service::delivery::{DeliveryError, PushDelivery, PushMessage};
use flock_service::{ServiceContextBuilder, ServiceSettings};
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Password given to every seeded login
pub const TEST_PASSWORD: &str = "field service 2024";

const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// Push backend that records deliveries instead of calling a push service
#[derive(Default)]
pub struct RecordingPush {
    delivered: Mutex<Vec<String>>,
    gone: Mutex<Vec<String>>,
}

impl RecordingPush {
    /// Answer 410 Gone for this endpoint
    pub fn expire(&self, endpoint: &str) {
        self.gone.lock().push(endpoint.to_string());
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl PushDelivery for RecordingPush {
    async fn deliver(
        &self,
        subscription: &PushSubscription,
        _message: &PushMessage,
    ) -> Result<(), DeliveryError> {
        if self.gone.lock().contains(&subscription.endpoint) {
            return Err(DeliveryError::Gone(410));
        }
        self.delivered.lock().push(subscription.endpoint.clone());
        Ok(())
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub push: Arc<RecordingPush>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on an ephemeral port
    pub async fn start() -> Result<Self> {
        let mut config = AppConfig::with_defaults("postgres://unused", TEST_JWT_SECRET);
        config.rate_limit.requests_per_second = 1000;
        config.rate_limit.burst = 1000;

        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush::default());

        let mut settings = ServiceSettings::from_config(&config);
        settings.vapid_public_key = Some(VapidKeyPair::generate().public_key_base64());

        let service_context = ServiceContextBuilder::new()
            .repositories(store.clone())
            .session_store(Arc::new(MemorySessionStore::new(Duration::from_secs(3600))))
            .jwt_service(Arc::new(JwtService::from_config(&config.jwt)))
            .push_delivery(push.clone())
            .health_probe(store.clone())
            .settings(settings)
            .build()?;

        let app = create_app(AppState::new(service_context, config))?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            store,
            push,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Insert a member who can log in with [`TEST_PASSWORD`]
    pub fn seed_login(&self, name: &str, role: Role) -> Result<Member> {
        let mut member = Member::new(MemberId::new(), name.to_string());
        member.email = Some(format!(
            "{}.{}@example.org",
            name.to_lowercase().replace(' ', "."),
            crate::fixtures::unique_suffix()
        ));
        member.role = role;
        self.store
            .seed_member(member.clone(), Some(hash_password(TEST_PASSWORD)?));
        Ok(member)
    }

    /// Insert a member without a login
    pub fn seed_member(&self, name: &str, location: Option<(f64, f64)>) -> Result<Member> {
        let mut member = Member::new(MemberId::new(), name.to_string());
        if let Some((lat, lng)) = location {
            member.location = Some(GeoLocation::new(lat, lng)?);
        }
        self.store.seed_member(member.clone(), None);
        Ok(member)
    }

    /// Log a seeded member in and return the access token
    pub async fn login_as(&self, member: &Member) -> Result<String> {
        let email = member.email.clone().context("member has no login")?;
        let response = self
            .post("/api/v1/auth/login", &crate::fixtures::LoginRequest::new(email))
            .await?;
        let auth: crate::fixtures::AuthResponse = assert_json(response, StatusCode::OK).await?;
        Ok(auth.access_token)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        self.send_auth(self.client.post(self.url(path)).json(body), token)
            .await
    }

    /// POST with no body at all
    pub async fn post_empty_auth(&self, path: &str, token: &str) -> Result<Response> {
        self.send_auth(self.client.post(self.url(path)), token).await
    }

    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        self.send_auth(self.client.patch(self.url(path)).json(body), token)
            .await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        self.send_auth(self.client.delete(self.url(path)), token).await
    }

    async fn send_auth(&self, request: RequestBuilder, token: &str) -> Result<Response> {
        Ok(request.bearer_auth(token).send().await?)
    }
}

/// Assert response status code
pub async fn assert_status(response: Response, expected: StatusCode) -> Result<Response> {
    let status = response.status();
    if status != expected {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Expected status {expected}, got {status}. Body: {body}");
    }
    Ok(response)
}

/// Assert response status and deserialize its JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected: StatusCode) -> Result<T> {
    let response = assert_status(response, expected).await?;
    Ok(response.json::<T>().await?)
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected: StatusCode) -> Result<String> {
    let body: serde_json::Value = assert_json(response, expected).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .context("error body has no code")
}
