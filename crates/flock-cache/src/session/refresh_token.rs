//! Refresh-token sessions in Redis.
//!
//! Each token is stored under its own key with a TTL matching the refresh
//! token lifetime, and indexed in a per-member set so every session of a
//! member can be revoked at once.

use async_trait::async_trait;
use redis::AsyncCommands;

use flock_core::error::DomainError;
use flock_core::traits::{RepoResult, SessionRecord, SessionStore};
use flock_core::value_objects::MemberId;

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for refresh tokens
const REFRESH_TOKEN_PREFIX: &str = "flock:refresh_token:";

/// Key prefix for the per-member token index
const MEMBER_TOKENS_PREFIX: &str = "flock:member_tokens:";

/// Default TTL for refresh tokens (7 days)
const DEFAULT_REFRESH_TOKEN_TTL: u64 = 7 * 24 * 60 * 60;

/// Redis-backed [`SessionStore`]
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    fn key(token_id: &str) -> String {
        format!("{REFRESH_TOKEN_PREFIX}{token_id}")
    }

    fn member_key(member_id: MemberId) -> String {
        format!("{MEMBER_TOKENS_PREFIX}{member_id}")
    }

    async fn store_inner(&self, token_id: &str, session: &SessionRecord) -> RedisResult<()> {
        self.pool
            .set_json(&Self::key(token_id), session, self.ttl_seconds)
            .await?;

        let member_key = Self::member_key(session.member_id);
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(&member_key, token_id).await?;
        conn.expire::<_, ()>(&member_key, i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX))
            .await?;
        Ok(())
    }

    async fn revoke_inner(&self, token_id: &str) -> RedisResult<bool> {
        let key = Self::key(token_id);
        if let Some(session) = self.pool.get_json::<SessionRecord>(&key).await? {
            let mut conn = self.pool.get().await?;
            conn.srem::<_, _, ()>(Self::member_key(session.member_id), token_id)
                .await?;
        }
        Ok(self.pool.delete(&[key]).await? > 0)
    }

    async fn revoke_all_inner(&self, member_id: MemberId) -> RedisResult<u32> {
        let member_key = Self::member_key(member_id);
        let mut conn = self.pool.get().await?;

        let token_ids: Vec<String> = conn.smembers(&member_key).await?;
        let keys: Vec<String> = token_ids.iter().map(|id| Self::key(id)).collect();
        let deleted = self.pool.delete(&keys).await?;
        conn.del::<_, ()>(&member_key).await?;

        Ok(deleted)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn store(&self, token_id: &str, session: &SessionRecord) -> RepoResult<()> {
        self.store_inner(token_id, session).await?;
        tracing::debug!(
            member_id = %session.member_id,
            session_id = %session.session_id,
            "Stored refresh session"
        );
        Ok(())
    }

    async fn validate(&self, token_id: &str) -> RepoResult<Option<SessionRecord>> {
        self.pool
            .get_json(&Self::key(token_id))
            .await
            .map_err(DomainError::from)
    }

    async fn revoke(&self, token_id: &str) -> RepoResult<bool> {
        let deleted = self.revoke_inner(token_id).await?;
        if deleted {
            tracing::debug!(token_id = %token_id, "Revoked refresh session");
        }
        Ok(deleted)
    }

    async fn revoke_all_for_member(&self, member_id: MemberId) -> RepoResult<u32> {
        let count = self.revoke_all_inner(member_id).await?;
        tracing::info!(member_id = %member_id, count, "Revoked all refresh sessions");
        Ok(count)
    }
}
