//! PostgreSQL implementation of ReportRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::FieldServiceReport;
use flock_core::error::DomainError;
use flock_core::traits::{ReportRepository, RepoResult};
use flock_core::value_objects::{MemberId, ServiceMonth};

use crate::models::ReportModel;

use super::error::{map_db_error, map_unique_violation};

const REPORT_COLUMNS: &str =
    "id, member_id, month, participated, bible_studies, hours, remarks, submitted_at";

#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    #[instrument(skip(self, report), fields(member_id = %report.member_id, month = %report.month))]
    async fn create(&self, report: &FieldServiceReport) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO field_service_reports
                (id, member_id, month, participated, bible_studies, hours, remarks, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(report.id.into_inner())
        .bind(report.member_id.into_inner())
        .bind(report.month.first_day())
        .bind(report.participated)
        .bind(report.bible_studies)
        .bind(report.hours)
        .bind(&report.remarks)
        .bind(report.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ReportAlreadySubmitted(report.month)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_for_member(
        &self,
        member_id: MemberId,
        month: ServiceMonth,
    ) -> RepoResult<Option<FieldServiceReport>> {
        let row = sqlx::query_as::<_, ReportModel>(&format!(
            "SELECT {REPORT_COLUMNS} FROM field_service_reports WHERE member_id = $1 AND month = $2"
        ))
        .bind(member_id.into_inner())
        .bind(month.first_day())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(FieldServiceReport::from))
    }

    #[instrument(skip(self))]
    async fn find_by_month(&self, month: ServiceMonth) -> RepoResult<Vec<FieldServiceReport>> {
        let rows = sqlx::query_as::<_, ReportModel>(&format!(
            "SELECT {REPORT_COLUMNS} FROM field_service_reports WHERE month = $1 ORDER BY submitted_at"
        ))
        .bind(month.first_day())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(FieldServiceReport::from).collect())
    }
}
