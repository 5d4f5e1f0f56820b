//! Group handlers

use axum::{extract::State, Json};
use flock_core::GroupId;
use flock_service::dto::{CreateGroupRequest, GroupResponse, MemberResponse};
use flock_service::services::GroupService;

use crate::extractors::{CurrentActor, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /groups
pub async fn list_groups(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    let groups = GroupService::new(state.service_context())
        .list_for_actor(&actor)
        .await?;
    Ok(Json(groups))
}

/// GET /groups/:group_id/members
pub async fn group_members(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(group_id): IdPath<GroupId>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = GroupService::new(state.service_context())
        .members(&actor, group_id)
        .await?;
    Ok(Json(members))
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<Json<GroupResponse>>> {
    let group = GroupService::new(state.service_context())
        .create(&actor, request)
        .await?;
    Ok(Created(Json(group)))
}
