//! Push subscription and SMS log row <-> entity mappers

use flock_core::entities::{PushKeys, PushSubscription, SmsLog};
use flock_core::value_objects::ServiceMonth;

use crate::models::{PushSubscriptionModel, SmsLogModel};

impl From<PushSubscriptionModel> for PushSubscription {
    fn from(model: PushSubscriptionModel) -> Self {
        PushSubscription {
            id: model.id.into(),
            member_id: model.member_id.into(),
            endpoint: model.endpoint,
            keys: PushKeys {
                p256dh: model.p256dh,
                auth: model.auth,
            },
            user_agent: model.user_agent,
            created_at: model.created_at,
            last_used: model.last_used,
            is_active: model.is_active,
        }
    }
}

impl From<SmsLogModel> for SmsLog {
    fn from(model: SmsLogModel) -> Self {
        SmsLog {
            id: model.id.into(),
            recipient_id: model.recipient_id.into(),
            phone: model.phone,
            message: model.message,
            sender_id: model.sender_id.into(),
            month: ServiceMonth::from(model.month),
            sent_at: model.sent_at,
        }
    }
}
