//! PostgreSQL implementation of SmsLogRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::SmsLog;
use flock_core::traits::{RepoResult, SmsLogRepository};
use flock_core::value_objects::{MemberId, ServiceMonth};

use crate::models::SmsLogModel;

use super::error::map_db_error;

const SMS_LOG_COLUMNS: &str = "id, recipient_id, phone, message, sender_id, month, sent_at";

#[derive(Clone)]
pub struct PgSmsLogRepository {
    pool: PgPool,
}

impl PgSmsLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SmsLogRepository for PgSmsLogRepository {
    #[instrument(skip(self, entry), fields(recipient_id = %entry.recipient_id))]
    async fn append(&self, entry: &SmsLog) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO sms_logs (id, recipient_id, phone, message, sender_id, month, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(entry.id.into_inner())
        .bind(entry.recipient_id.into_inner())
        .bind(&entry.phone)
        .bind(&entry.message)
        .bind(entry.sender_id.into_inner())
        .bind(entry.month.first_day())
        .bind(entry.sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_recipient_and_month(
        &self,
        recipient_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Vec<SmsLog>> {
        let rows = sqlx::query_as::<_, SmsLogModel>(&format!(
            "SELECT {SMS_LOG_COLUMNS} FROM sms_logs WHERE recipient_id = $1 AND month = $2 ORDER BY sent_at DESC"
        ))
        .bind(recipient_id.into_inner())
        .bind(month.first_day())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(SmsLog::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<SmsLog>> {
        let rows = sqlx::query_as::<_, SmsLogModel>(&format!(
            "SELECT {SMS_LOG_COLUMNS} FROM sms_logs WHERE month = $1 ORDER BY sent_at DESC"
        ))
        .bind(month.first_day())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(SmsLog::from).collect())
    }
}
