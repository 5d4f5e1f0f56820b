//! PostgreSQL implementation of PushSubscriptionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::PushSubscription;
use flock_core::error::DomainError;
use flock_core::traits::{PushSubscriptionRepository, RepoResult};
use flock_core::value_objects::{MemberId, SubscriptionId};

use crate::models::PushSubscriptionModel;

use super::error::{map_db_error, map_foreign_key_violation};

const SUBSCRIPTION_COLUMNS: &str =
    "id, member_id, endpoint, p256dh, auth, user_agent, created_at, last_used, is_active";

#[derive(Clone)]
pub struct PgPushSubscriptionRepository {
    pool: PgPool,
}

impl PgPushSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushSubscriptionRepository for PgPushSubscriptionRepository {
    #[instrument(skip(self, subscription), fields(member_id = %subscription.member_id))]
    async fn upsert(&self, subscription: &PushSubscription) -> RepoResult<PushSubscription> {
        // The existing row keeps its id; everything else is replaced
        let row = sqlx::query_as::<_, PushSubscriptionModel>(&format!(
            r"
            INSERT INTO push_subscriptions
                (id, member_id, endpoint, p256dh, auth, user_agent, created_at, last_used, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, TRUE)
            ON CONFLICT (member_id) DO UPDATE SET
                endpoint = EXCLUDED.endpoint,
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth,
                user_agent = EXCLUDED.user_agent,
                created_at = EXCLUDED.created_at,
                last_used = EXCLUDED.last_used,
                is_active = TRUE
            RETURNING {SUBSCRIPTION_COLUMNS}
            "
        ))
        .bind(subscription.id.into_inner())
        .bind(subscription.member_id.into_inner())
        .bind(&subscription.endpoint)
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .bind(&subscription.user_agent)
        .bind(subscription.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key_violation(e, || DomainError::MemberNotFound(subscription.member_id))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn record_send_result(
        &self,
        id: SubscriptionId,
        success: bool,
        at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = if success {
            sqlx::query("UPDATE push_subscriptions SET last_used = $2 WHERE id = $1")
                .bind(id.into_inner())
                .bind(at)
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("UPDATE push_subscriptions SET is_active = FALSE WHERE id = $1")
                .bind(id.into_inner())
                .execute(&self.pool)
                .await
        }
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SubscriptionNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_active(&self, member_id: Option<MemberId>) -> RepoResult<Vec<PushSubscription>> {
        let rows = sqlx::query_as::<_, PushSubscriptionModel>(&format!(
            r"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM push_subscriptions
            WHERE is_active AND ($1::uuid IS NULL OR member_id = $1)
            ORDER BY created_at
            "
        ))
        .bind(member_id.map(MemberId::into_inner))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(PushSubscription::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, member_id: MemberId) -> RepoResult<Option<PushSubscription>> {
        let row = sqlx::query_as::<_, PushSubscriptionModel>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions WHERE member_id = $1"
        ))
        .bind(member_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(PushSubscription::from))
    }
}
