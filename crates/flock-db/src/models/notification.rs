//! Push subscription and SMS log database models

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PushSubscriptionModel {
    pub id: Uuid,
    pub member_id: Uuid,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct SmsLogModel {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub phone: String,
    pub message: String,
    pub sender_id: Uuid,
    pub month: NaiveDate,
    pub sent_at: DateTime<Utc>,
}
