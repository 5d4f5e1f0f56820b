//! SMS log entry - append-only record of a sent text message

use chrono::{DateTime, Utc};

use crate::value_objects::{MemberId, ServiceMonth, SmsLogId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsLog {
    pub id: SmsLogId,
    pub recipient_id: MemberId,
    /// Phone number at the time of sending
    pub phone: String,
    pub message: String,
    pub sender_id: MemberId,
    pub month: ServiceMonth,
    pub sent_at: DateTime<Utc>,
}

impl SmsLog {
    pub fn new(
        recipient_id: MemberId,
        phone: String,
        message: String,
        sender_id: MemberId,
        month: ServiceMonth,
    ) -> Self {
        Self {
            id: SmsLogId::new(),
            recipient_id,
            phone,
            message,
            sender_id,
            month,
            sent_at: Utc::now(),
        }
    }
}
