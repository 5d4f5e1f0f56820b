//! Territory service
//!
//! Territory cards, check-out history and coverage analytics.

use chrono::Utc;
use flock_core::entities::{Territory, TerritoryAnalytics, TerritoryAssignment};
use flock_core::value_objects::{AssignmentId, TerritoryId};
use flock_core::DomainError;
use tracing::{info, instrument};

use crate::dto::{
    AssignTerritoryRequest, AssignmentResponse, CreateTerritoryRequest, TerritoryResponse,
};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::ServiceResult;

pub const TERRITORIES_ROUTE: &str = "/dashboard/territories";
pub const ANALYTICS_ROUTE: &str = "/dashboard/territories/analytics";

pub struct TerritoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TerritoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn list(&self, actor: &Actor) -> ServiceResult<Vec<TerritoryResponse>> {
        self.ctx.gate().authorize(actor, TERRITORIES_ROUTE)?;

        let territories = self
            .ctx
            .storage(self.ctx.territory_repo().list_all())
            .await?;
        Ok(territories.into_iter().map(TerritoryResponse::from).collect())
    }

    /// Full check-out history, newest first
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn assignments(&self, actor: &Actor) -> ServiceResult<Vec<AssignmentResponse>> {
        self.ctx.gate().authorize(actor, TERRITORIES_ROUTE)?;

        let assignments = self
            .ctx
            .storage(self.ctx.assignment_repo().list_all())
            .await?;
        Ok(assignments
            .into_iter()
            .map(AssignmentResponse::from)
            .collect())
    }

    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn analytics(&self, actor: &Actor) -> ServiceResult<TerritoryAnalytics> {
        self.ctx.gate().authorize(actor, ANALYTICS_ROUTE)?;

        let territories = self
            .ctx
            .storage(self.ctx.territory_repo().list_all())
            .await?;
        let assignments = self
            .ctx
            .storage(self.ctx.assignment_repo().list_all())
            .await?;

        Ok(TerritoryAnalytics::compute(
            &territories,
            &assignments,
            Utc::now(),
        ))
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateTerritoryRequest,
    ) -> ServiceResult<TerritoryResponse> {
        self.ctx.gate().authorize(actor, "territories:manage")?;

        let mut territory = Territory::new(
            TerritoryId::new(),
            request.number.trim().to_string(),
            request.name.trim().to_string(),
        );
        territory.locality = request.locality;
        territory.notes = request.notes;

        self.ctx
            .storage(self.ctx.territory_repo().create(&territory))
            .await?;

        info!(territory_id = %territory.id, number = %territory.number, "Territory created");
        Ok(TerritoryResponse::from(territory))
    }

    /// Check a territory out to a member
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn assign(
        &self,
        actor: &Actor,
        territory_id: TerritoryId,
        request: AssignTerritoryRequest,
    ) -> ServiceResult<AssignmentResponse> {
        self.ctx.gate().authorize(actor, "territories:manage")?;

        self.ctx
            .storage(self.ctx.territory_repo().find_by_id(territory_id))
            .await?
            .ok_or(DomainError::TerritoryNotFound(territory_id))?;
        self.ctx
            .storage(self.ctx.member_repo().find_by_id(request.member_id))
            .await?
            .ok_or(DomainError::MemberNotFound(request.member_id))?;

        if self
            .ctx
            .storage(self.ctx.assignment_repo().find_open(territory_id))
            .await?
            .is_some()
        {
            return Err(DomainError::TerritoryAlreadyAssigned.into());
        }

        let assignment =
            TerritoryAssignment::new(AssignmentId::new(), territory_id, request.member_id);
        self.ctx
            .storage(self.ctx.assignment_repo().create(&assignment))
            .await?;

        info!(
            territory_id = %territory_id,
            member_id = %request.member_id,
            "Territory checked out"
        );
        Ok(AssignmentResponse::from(assignment))
    }

    /// Record that a checked-out territory was worked and returned
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn complete(
        &self,
        actor: &Actor,
        assignment_id: AssignmentId,
    ) -> ServiceResult<AssignmentResponse> {
        self.ctx.gate().authorize(actor, "territories:manage")?;

        let mut assignment = self
            .ctx
            .storage(self.ctx.assignment_repo().find_by_id(assignment_id))
            .await?
            .filter(TerritoryAssignment::is_open)
            .ok_or(DomainError::AssignmentNotFound)?;

        let now = Utc::now();
        self.ctx
            .storage(self.ctx.assignment_repo().complete(assignment_id, now))
            .await?;
        assignment.complete(now.max(assignment.assigned_at));

        info!(assignment_id = %assignment_id, "Territory returned");
        Ok(AssignmentResponse::from(assignment))
    }
}
