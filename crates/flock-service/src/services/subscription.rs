//! Push subscription service
//!
//! A member keeps a single browser subscription. Subscribing again replaces
//! the endpoint and keys and reactivates it.

use flock_core::entities::{PushKeys, PushSubscription};
use flock_core::value_objects::SubscriptionId;
use tracing::{info, instrument};

use crate::dto::{SubscribeRequest, SubscriptionResponse, VapidPublicKeyResponse};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Stored user agents are cut to this many characters
const MAX_USER_AGENT_LEN: usize = 512;

pub struct SubscriptionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SubscriptionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Public application server key browsers subscribe with
    pub fn vapid_public_key(&self) -> ServiceResult<VapidPublicKeyResponse> {
        self.ctx
            .settings()
            .vapid_public_key
            .clone()
            .map(|public_key| VapidPublicKeyResponse { public_key })
            .ok_or_else(|| ServiceError::not_found("VAPID public key", "push is not configured"))
    }

    /// Create or replace the actor's subscription
    #[instrument(skip(self, actor, request, user_agent), fields(actor = %actor.member_id))]
    pub async fn subscribe(
        &self,
        actor: &Actor,
        request: SubscribeRequest,
        user_agent: Option<String>,
    ) -> ServiceResult<SubscriptionResponse> {
        self.ctx.gate().authorize(actor, "notifications:subscribe")?;

        let user_agent =
            user_agent.map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect::<String>());
        let subscription = PushSubscription::new(
            SubscriptionId::new(),
            actor.member_id,
            request.endpoint,
            PushKeys {
                p256dh: request.keys.p256dh,
                auth: request.keys.auth,
            },
            user_agent,
        );

        let stored = self
            .ctx
            .storage(self.ctx.subscription_repo().upsert(&subscription))
            .await?;

        info!(subscription_id = %stored.id, "Push subscription stored");
        Ok(SubscriptionResponse::from(stored))
    }

    /// The actor's subscription, active or not
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn current(&self, actor: &Actor) -> ServiceResult<Option<SubscriptionResponse>> {
        self.ctx.gate().authorize(actor, "notifications:subscribe")?;

        let subscription = self
            .ctx
            .storage(self.ctx.subscription_repo().find_by_member(actor.member_id))
            .await?;
        Ok(subscription.map(SubscriptionResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::PushKeysRequest;
    use crate::test_support::{actor_for, seed_member, TestEnv};
    use flock_core::Role;

    fn request(endpoint: &str) -> SubscribeRequest {
        SubscribeRequest {
            endpoint: endpoint.to_string(),
            keys: PushKeysRequest {
                p256dh: "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA".to_string(),
                auth: "tBHItJI5svbpez7KI4CCXg".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_resubscribe_replaces() {
        let env = TestEnv::new();
        let publisher = seed_member(&env, "Pat", Role::Publisher);
        let service = SubscriptionService::new(&env.ctx);
        let actor = actor_for(&publisher);

        let first = service
            .subscribe(&actor, request("https://push.example.com/a"), None)
            .await
            .unwrap();
        let second = service
            .subscribe(
                &actor,
                request("https://push.example.com/b"),
                Some("Firefox".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.endpoint, "https://push.example.com/b");

        let active = env
            .ctx
            .subscription_repo()
            .list_active(Some(publisher.id))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].user_agent.as_deref(), Some("Firefox"));
    }

    #[tokio::test]
    async fn test_vapid_key_requires_configuration() {
        let env = TestEnv::new();
        assert!(SubscriptionService::new(&env.ctx).vapid_public_key().is_err());

        let env = TestEnv::with_settings(|s| s.vapid_public_key = Some("BPub".to_string()));
        let key = SubscriptionService::new(&env.ctx).vapid_public_key().unwrap();
        assert_eq!(key.public_key, "BPub");
    }
}
