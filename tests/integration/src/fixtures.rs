//! Test fixtures and data generators
//!
//! Request bodies and the response shapes the tests read back.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::helpers::TEST_PASSWORD;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: String) -> Self {
        Self {
            email,
            password: TEST_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub member: MemberResponse,
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub id: String,
    pub full_name: String,
    pub role: String,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of the member map
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLocation {
    pub full_name: String,
    pub phone: Option<String>,
    pub location: Location,
    pub role: String,
}

#[derive(Debug, Serialize, Default)]
pub struct CreateMemberRequest {
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl CreateMemberRequest {
    pub fn unique() -> Self {
        Self {
            full_name: format!("Member {}", unique_suffix()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Browser `PushSubscription.toJSON()` body
#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    pub keys: PushKeys,
}

impl SubscribeRequest {
    pub fn unique() -> Self {
        Self {
            endpoint: format!("https://push.example.net/send/{}", unique_suffix()),
            keys: PushKeys {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM".to_string(),
                auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub endpoint: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationRequest {
    pub title: String,
    pub body: String,
}

impl SendNotificationRequest {
    pub fn reminder() -> Self {
        Self {
            title: "Meeting tonight".to_string(),
            body: "Doors open at 7pm".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct NotificationSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub deactivated: usize,
    pub unrecorded: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReminderSummary {
    pub month: String,
    pub sent: usize,
    pub already_reported: usize,
    pub already_messaged: usize,
    pub failed: usize,
    pub unlogged: usize,
}
