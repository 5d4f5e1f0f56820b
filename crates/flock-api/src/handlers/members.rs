//! Member handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flock_core::{MemberId, MemberLocation};
use flock_service::dto::{
    ChangeRoleRequest, CreateMemberRequest, MemberResponse, PaginatedResponse, SetGroupRequest,
    UpdateMemberRequest,
};
use flock_service::services::{AuthService, MemberService};
use serde_json::json;

use crate::extractors::{AuthUser, CurrentActor, IdPath, Pagination, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Members with coordinates for the dashboard map
///
/// GET /api/members-with-location
///
/// Keeps the map's original contract: a bare JSON array, and
/// `{"error": "Failed to fetch members"}` when storage fails. The actor is
/// resolved here rather than by [`CurrentActor`] so a failing member lookup
/// gets the same body.
pub async fn members_with_location_legacy(
    State(state): State<AppState>,
    user: AuthUser,
) -> Response {
    let ctx = state.service_context();
    let result = async {
        let actor = AuthService::new(ctx).actor_for(user.member_id).await?;
        MemberService::new(ctx).members_with_location(&actor).await
    }
    .await;

    match result {
        Ok(members) => Json(members).into_response(),
        Err(e) if e.is_data_access() => {
            tracing::error!(error = %e, "Failed to fetch members with location");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch members" })),
            )
                .into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /members/locations
pub async fn members_with_location(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<MemberLocation>>> {
    let members = MemberService::new(state.service_context())
        .members_with_location(&actor)
        .await?;
    Ok(Json(members))
}

/// GET /members
pub async fn list_members(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    pagination: Pagination,
) -> ApiResult<Json<PaginatedResponse<MemberResponse>>> {
    let page = MemberService::new(state.service_context())
        .list(&actor, pagination.limit, pagination.offset)
        .await?;
    Ok(Json(page))
}

/// GET /members/:member_id
pub async fn get_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(member_id): IdPath<MemberId>,
) -> ApiResult<Json<MemberResponse>> {
    let member = MemberService::new(state.service_context())
        .get(&actor, member_id)
        .await?;
    Ok(Json(member))
}

/// POST /members
pub async fn create_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<CreateMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let member = MemberService::new(state.service_context())
        .create(&actor, request)
        .await?;
    Ok(Created(Json(member)))
}

/// PATCH /members/:member_id
pub async fn update_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(member_id): IdPath<MemberId>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member = MemberService::new(state.service_context())
        .update(&actor, member_id, request)
        .await?;
    Ok(Json(member))
}

/// PUT /members/:member_id/role
pub async fn change_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(member_id): IdPath<MemberId>,
    Json(request): Json<ChangeRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member = MemberService::new(state.service_context())
        .change_role(&actor, member_id, request)
        .await?;
    Ok(Json(member))
}

/// PUT /members/:member_id/group
pub async fn set_group(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    IdPath(member_id): IdPath<MemberId>,
    Json(request): Json<SetGroupRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let member = MemberService::new(state.service_context())
        .set_group(&actor, member_id, request)
        .await?;
    Ok(Json(member))
}
