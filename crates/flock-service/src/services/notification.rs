//! Push notification fan-out
//!
//! Delivers one message to every active subscription (or to the given
//! members) with bounded concurrency, then records each outcome. Any failed
//! delivery deactivates the subscription until the member subscribes again.
//! An outcome that cannot be recorded is logged and counted; the remaining
//! outcomes are still recorded.

use std::collections::HashSet;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};

use crate::delivery::{DeliveryError, PushMessage};
use crate::dto::{NotificationSummary, SendNotificationRequest};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn notify(
        &self,
        actor: &Actor,
        request: SendNotificationRequest,
    ) -> ServiceResult<NotificationSummary> {
        self.ctx.gate().authorize(actor, "notifications:send")?;

        let delivery = self.ctx.push_delivery().ok_or_else(|| {
            ServiceError::ExternalService("push notifications are not configured".to_string())
        })?;

        let mut subscriptions = Vec::new();
        match request.member_ids {
            Some(member_ids) => {
                let mut seen = HashSet::new();
                for member_id in member_ids.into_iter().filter(|id| seen.insert(*id)) {
                    subscriptions.extend(
                        self.ctx
                            .storage(self.ctx.subscription_repo().list_active(Some(member_id)))
                            .await?,
                    );
                }
            }
            None => {
                subscriptions = self
                    .ctx
                    .storage(self.ctx.subscription_repo().list_active(None))
                    .await?;
            }
        }

        let message = PushMessage {
            title: request.title,
            body: request.body,
            url: request.url,
        };

        let message = &message;
        let outcomes: Vec<_> = stream::iter(subscriptions)
            .map(|subscription| async move {
                let result = delivery.deliver(&subscription, message).await;
                (subscription, result)
            })
            .buffer_unordered(self.ctx.settings().push_concurrency.max(1))
            .collect()
            .await;

        let mut summary = NotificationSummary {
            attempted: outcomes.len(),
            delivered: 0,
            deactivated: 0,
            unrecorded: 0,
        };

        for (subscription, result) in outcomes {
            let success = match result {
                Ok(()) => true,
                Err(DeliveryError::Gone(status)) => {
                    info!(subscription_id = %subscription.id, status, "Push subscription expired");
                    false
                }
                Err(e) => {
                    warn!(subscription_id = %subscription.id, error = %e, "Push delivery failed");
                    false
                }
            };

            if let Err(e) = self
                .ctx
                .storage(self.ctx.subscription_repo().record_send_result(
                    subscription.id,
                    success,
                    Utc::now(),
                ))
                .await
            {
                error!(
                    subscription_id = %subscription.id,
                    success,
                    error = %e,
                    "Failed to record push outcome"
                );
                summary.unrecorded += 1;
            }

            if success {
                summary.delivered += 1;
            } else {
                summary.deactivated += 1;
            }
        }

        info!(
            attempted = summary.attempted,
            delivered = summary.delivered,
            deactivated = summary.deactivated,
            unrecorded = summary.unrecorded,
            "Push fan-out finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dto::{PushKeysRequest, SubscribeRequest};
    use crate::services::SubscriptionService;
    use crate::test_support::{actor_for, seed_member, FakePush, TestEnv};
    use flock_core::Role;

    fn subscribe_request(endpoint: &str) -> SubscribeRequest {
        SubscribeRequest {
            endpoint: endpoint.to_string(),
            keys: PushKeysRequest {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".to_string(),
                auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
            },
        }
    }

    fn broadcast() -> SendNotificationRequest {
        SendNotificationRequest {
            title: "Meeting moved".to_string(),
            body: "Thursday meeting starts at 19:30".to_string(),
            url: None,
            member_ids: None,
        }
    }

    #[tokio::test]
    async fn test_failed_delivery_deactivates_until_resubscribe() {
        let push = Arc::new(FakePush::failing_for("https://push.example.com/dead"));
        let env = TestEnv::with_push(push.clone());
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let pat = seed_member(&env, "Pat", Role::Publisher);
        let kim = seed_member(&env, "Kim", Role::Publisher);
        let subscriptions = SubscriptionService::new(&env.ctx);

        subscriptions
            .subscribe(&actor_for(&pat), subscribe_request("https://push.example.com/ok"), None)
            .await
            .unwrap();
        subscriptions
            .subscribe(&actor_for(&kim), subscribe_request("https://push.example.com/dead"), None)
            .await
            .unwrap();

        let service = NotificationService::new(&env.ctx);
        let summary = service.notify(&actor_for(&elder), broadcast()).await.unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.deactivated, 1);

        let active = env.ctx.subscription_repo().list_active(None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].member_id, pat.id);

        // Subscribing again brings the member back
        subscriptions
            .subscribe(&actor_for(&kim), subscribe_request("https://push.example.com/new"), None)
            .await
            .unwrap();
        let active = env.ctx.subscription_repo().list_active(None).await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(push.sent(), 2);
    }

    #[tokio::test]
    async fn test_targeted_and_unauthorized() {
        let push = Arc::new(FakePush::default());
        let env = TestEnv::with_push(push.clone());
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let pat = seed_member(&env, "Pat", Role::Publisher);
        let kim = seed_member(&env, "Kim", Role::Publisher);
        let subscriptions = SubscriptionService::new(&env.ctx);
        for (member, endpoint) in [(&pat, "https://p.example.com/1"), (&kim, "https://p.example.com/2")] {
            subscriptions
                .subscribe(&actor_for(member), subscribe_request(endpoint), None)
                .await
                .unwrap();
        }

        let service = NotificationService::new(&env.ctx);
        let mut request = broadcast();
        request.member_ids = Some(vec![kim.id, kim.id]);
        let summary = service.notify(&actor_for(&elder), request).await.unwrap();
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.delivered, 1);

        let err = service.notify(&actor_for(&pat), broadcast()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
        assert_eq!(push.sent(), 1);
    }

    #[tokio::test]
    async fn test_unrecorded_outcomes_do_not_abort_fan_out() {
        let store = Arc::new(flock_db::MemoryStore::new());
        let push = Arc::new(FakePush::outage_during_delivery(store.clone()));
        let env = TestEnv::with_store_and_push(store.clone(), push.clone());
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let pat = seed_member(&env, "Pat", Role::Publisher);
        let kim = seed_member(&env, "Kim", Role::Publisher);
        let subscriptions = SubscriptionService::new(&env.ctx);
        for (member, endpoint) in [(&pat, "https://p.example.com/1"), (&kim, "https://p.example.com/2")] {
            subscriptions
                .subscribe(&actor_for(member), subscribe_request(endpoint), None)
                .await
                .unwrap();
        }

        let summary = NotificationService::new(&env.ctx)
            .notify(&actor_for(&elder), broadcast())
            .await
            .unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.unrecorded, 2);
        assert_eq!(push.sent(), 2);

        store.set_unavailable(false);
        let active = env.ctx.subscription_repo().list_active(None).await.unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_push_is_reported() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let err = NotificationService::new(&env.ctx)
            .notify(&actor_for(&elder), broadcast())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalService(_)));
    }
}
