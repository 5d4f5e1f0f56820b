//! Territory handlers

use axum::{extract::State, Json};
use flock_core::{AssignmentId, TerritoryAnalytics, TerritoryId};
use flock_service::dto::{
    AssignTerritoryRequest, AssignmentResponse, CreateTerritoryRequest, TerritoryResponse,
};
use flock_service::services::TerritoryService;

use crate::extractors::{CurrentActor, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /territories
pub async fn list_territories(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<TerritoryResponse>>> {
    let territories = TerritoryService::new(state.service_context())
        .list(&actor)
        .await?;
    Ok(Json(territories))
}

/// GET /territories/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = TerritoryService::new(state.service_context())
        .assignments(&actor)
        .await?;
    Ok(Json(assignments))
}

/// GET /territories/analytics
pub async fn analytics(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<TerritoryAnalytics>> {
    let stats = TerritoryService::new(state.service_context())
        .analytics(&actor)
        .await?;
    Ok(Json(stats))
}

/// POST /territories
pub async fn create_territory(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<CreateTerritoryRequest>,
) -> ApiResult<Created<Json<TerritoryResponse>>> {
    let territory = TerritoryService::new(state.service_context())
        .create(&actor, request)
        .await?;
    Ok(Created(Json(territory)))
}

/// POST /territories/:territory_id/assignments
pub async fn assign_territory(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(territory_id): IdPath<TerritoryId>,
    Json(request): Json<AssignTerritoryRequest>,
) -> ApiResult<Created<Json<AssignmentResponse>>> {
    let assignment = TerritoryService::new(state.service_context())
        .assign(&actor, territory_id, request)
        .await?;
    Ok(Created(Json(assignment)))
}

/// POST /assignments/:assignment_id/complete
pub async fn complete_assignment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(assignment_id): IdPath<AssignmentId>,
) -> ApiResult<Json<AssignmentResponse>> {
    let assignment = TerritoryService::new(state.service_context())
        .complete(&actor, assignment_id)
        .await?;
    Ok(Json(assignment))
}
