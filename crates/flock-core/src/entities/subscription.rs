//! Push subscription entity - one browser push endpoint per member

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::{MemberId, SubscriptionId};

/// Keys the browser hands out with a push subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushKeys {
    /// Client public key (base64url P-256 point)
    pub p256dh: String,
    /// Client authentication secret (base64url)
    pub auth: String,
}

/// Push subscription
///
/// A member has at most one. Delivery failures deactivate it rather than
/// deleting it; subscribing again reactivates the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSubscription {
    pub id: SubscriptionId,
    pub member_id: MemberId,
    pub endpoint: String,
    pub keys: PushKeys,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub is_active: bool,
}

impl PushSubscription {
    /// Create a fresh, active subscription
    pub fn new(
        id: SubscriptionId,
        member_id: MemberId,
        endpoint: String,
        keys: PushKeys,
        user_agent: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            member_id,
            endpoint,
            keys,
            user_agent,
            created_at: now,
            last_used: now,
            is_active: true,
        }
    }

    /// Apply a delivery outcome
    pub fn record_send_result(&mut self, success: bool, at: DateTime<Utc>) {
        if success {
            self.last_used = at;
        } else {
            self.is_active = false;
        }
    }

    /// Active but unused for longer than `max_idle`
    pub fn is_stale(&self, now: DateTime<Utc>, max_idle: Duration) -> bool {
        self.is_active && now - self.last_used > max_idle
    }
}
