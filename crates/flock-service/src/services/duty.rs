//! Duty roster service

use chrono::{Duration, NaiveDate, Utc};
use flock_core::entities::Duty;
use flock_core::value_objects::DutyId;
use flock_core::DomainError;
use tracing::{info, instrument};

use crate::dto::{CreateDutyRequest, DutyRangeQuery, DutyResponse};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const DUTIES_ROUTE: &str = "/dashboard/duties";

/// Window listed when the caller gives no end date
const DEFAULT_WINDOW_DAYS: i64 = 35;
/// Longest range a single listing may cover
const MAX_WINDOW_DAYS: i64 = 366;

pub struct DutyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> DutyService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Duties within a date range, today onwards by default
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn list(
        &self,
        actor: &Actor,
        query: DutyRangeQuery,
    ) -> ServiceResult<Vec<DutyResponse>> {
        self.ctx.gate().authorize(actor, DUTIES_ROUTE)?;

        let (from, to) = resolve_range(query, Utc::now().date_naive())?;
        let duties = self
            .ctx
            .storage(self.ctx.duty_repo().list_between(from, to))
            .await?;
        Ok(duties.into_iter().map(DutyResponse::from).collect())
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn schedule(
        &self,
        actor: &Actor,
        request: CreateDutyRequest,
    ) -> ServiceResult<DutyResponse> {
        self.ctx.gate().authorize(actor, "duties:manage")?;

        self.ctx
            .storage(self.ctx.member_repo().find_by_id(request.member_id))
            .await?
            .ok_or(DomainError::MemberNotFound(request.member_id))?;

        let mut duty = Duty::new(DutyId::new(), request.kind, request.date, request.member_id);
        duty.notes = request.notes;

        self.ctx.storage(self.ctx.duty_repo().create(&duty)).await?;

        info!(duty_id = %duty.id, kind = %duty.kind, date = %duty.date, "Duty scheduled");
        Ok(DutyResponse::from(duty))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn remove(&self, actor: &Actor, duty_id: DutyId) -> ServiceResult<()> {
        self.ctx.gate().authorize(actor, "duties:manage")?;
        self.ctx.storage(self.ctx.duty_repo().delete(duty_id)).await?;
        info!(duty_id = %duty_id, "Duty removed");
        Ok(())
    }
}

fn resolve_range(query: DutyRangeQuery, today: NaiveDate) -> ServiceResult<(NaiveDate, NaiveDate)> {
    let from = query.from.unwrap_or(today);
    let to = query
        .to
        .unwrap_or(from + Duration::days(DEFAULT_WINDOW_DAYS));

    if to < from {
        return Err(ServiceError::validation("'to' must not be before 'from'"));
    }
    if (to - from).num_days() > MAX_WINDOW_DAYS {
        return Err(ServiceError::validation(format!(
            "Date range must not exceed {MAX_WINDOW_DAYS} days"
        )));
    }
    Ok((from, to))
}
