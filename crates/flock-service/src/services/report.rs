//! Field-service report service

use std::collections::HashSet;

use flock_core::entities::FieldServiceReport;
use flock_core::value_objects::{ReportId, ServiceMonth};
use flock_core::DomainError;
use tracing::{info, instrument};

use crate::dto::{MonthlyReportsResponse, ReportResponse, SubmitReportRequest};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::ServiceResult;

pub const REPORTS_ROUTE: &str = "/dashboard/reports";

/// Roster page size used when scanning for missing reports
const ROSTER_PAGE: i64 = 500;

pub struct ReportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Submit the actor's own report; one per month
    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id, month = %request.month))]
    pub async fn submit(
        &self,
        actor: &Actor,
        request: SubmitReportRequest,
    ) -> ServiceResult<ReportResponse> {
        self.ctx.gate().authorize(actor, "reports:submit")?;

        if request.month > ServiceMonth::current() {
            return Err(DomainError::ValidationError(format!(
                "cannot report for future month {}",
                request.month
            ))
            .into());
        }

        let mut report = FieldServiceReport::new(
            ReportId::new(),
            actor.member_id,
            request.month,
            request.participated,
        );
        report.bible_studies = request.bible_studies;
        report.hours = request.hours;
        report.remarks = request.remarks;
        report.validate()?;

        self.ctx
            .storage(self.ctx.report_repo().create(&report))
            .await?;

        info!(report_id = %report.id, "Report submitted");
        Ok(ReportResponse::from(report))
    }

    /// The actor's own report for a month, if submitted
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn own(
        &self,
        actor: &Actor,
        month: ServiceMonth,
    ) -> ServiceResult<Option<ReportResponse>> {
        self.ctx.gate().authorize(actor, "reports:submit")?;

        let report = self
            .ctx
            .storage(self.ctx.report_repo().find_for_member(actor.member_id, month))
            .await?;
        Ok(report.map(ReportResponse::from))
    }

    /// Every report for a month plus the members who have not reported
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn for_month(
        &self,
        actor: &Actor,
        month: ServiceMonth,
    ) -> ServiceResult<MonthlyReportsResponse> {
        self.ctx.gate().authorize(actor, REPORTS_ROUTE)?;

        let reports = self
            .ctx
            .storage(self.ctx.report_repo().find_by_month(month))
            .await?;
        let reported: HashSet<_> = reports.iter().map(|r| r.member_id).collect();

        let mut missing = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .ctx
                .storage(self.ctx.member_repo().list(ROSTER_PAGE, offset))
                .await?;
            let fetched = page.len();
            missing.extend(
                page.into_iter()
                    .map(|m| m.id)
                    .filter(|id| !reported.contains(id)),
            );
            if (fetched as i64) < ROSTER_PAGE {
                break;
            }
            offset += ROSTER_PAGE;
        }

        Ok(MonthlyReportsResponse {
            month,
            reports: reports.into_iter().map(ReportResponse::from).collect(),
            missing,
        })
    }
}
