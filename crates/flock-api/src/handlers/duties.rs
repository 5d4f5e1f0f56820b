//! Duty roster handlers

use axum::{
    extract::{Query, State},
    Json,
};
use flock_core::DutyId;
use flock_service::dto::{CreateDutyRequest, DutyRangeQuery, DutyResponse};
use flock_service::services::DutyService;

use crate::extractors::{CurrentActor, IdPath, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /duties?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn list_duties(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<DutyRangeQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<Vec<DutyResponse>>> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let duties = DutyService::new(state.service_context())
        .list(&actor, query)
        .await?;
    Ok(Json(duties))
}

/// POST /duties
pub async fn schedule_duty(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<CreateDutyRequest>,
) -> ApiResult<Created<Json<DutyResponse>>> {
    let duty = DutyService::new(state.service_context())
        .schedule(&actor, request)
        .await?;
    Ok(Created(Json(duty)))
}

/// DELETE /duties/:duty_id
pub async fn remove_duty(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(duty_id): IdPath<DutyId>,
) -> ApiResult<NoContent> {
    DutyService::new(state.service_context())
        .remove(&actor, duty_id)
        .await?;
    Ok(NoContent)
}
