//! PostgreSQL implementation of DutyRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::Duty;
use flock_core::error::DomainError;
use flock_core::traits::{DutyRepository, RepoResult};
use flock_core::value_objects::DutyId;

use crate::models::DutyModel;

use super::error::{map_db_error, map_foreign_key_violation};

#[derive(Clone)]
pub struct PgDutyRepository {
    pool: PgPool,
}

impl PgDutyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DutyRepository for PgDutyRepository {
    #[instrument(skip(self))]
    async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<Vec<Duty>> {
        let rows = sqlx::query_as::<_, DutyModel>(
            r"
            SELECT id, kind, date, member_id, notes
            FROM duties
            WHERE date BETWEEN $1 AND $2
            ORDER BY date, kind
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Duty::try_from).collect()
    }

    #[instrument(skip(self, duty), fields(duty_id = %duty.id, kind = %duty.kind))]
    async fn create(&self, duty: &Duty) -> RepoResult<()> {
        sqlx::query(
            "INSERT INTO duties (id, kind, date, member_id, notes) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(duty.id.into_inner())
        .bind(duty.kind.as_str())
        .bind(duty.date)
        .bind(duty.member_id.into_inner())
        .bind(&duty.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::MemberNotFound(duty.member_id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: DutyId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM duties WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::DutyNotFound);
        }
        Ok(())
    }
}
