//! Authentication handlers
//!
//! Login, token refresh, logout and the current member profile.

use axum::{extract::State, Json};
use flock_service::dto::{
    AuthResponse, CurrentMemberResponse, LoginRequest, LogoutRequest, RefreshTokenRequest,
};
use flock_service::services::AuthService;

use crate::extractors::{AuthUser, CurrentActor, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context()).login(request).await?;
    Ok(Json(response))
}

/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context())
        .refresh(request)
        .await?;
    Ok(Json(response))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<LogoutRequest>>,
) -> ApiResult<NoContent> {
    let refresh_token = body.and_then(|Json(b)| b.refresh_token);
    AuthService::new(state.service_context())
        .logout(auth.member_id, &auth.session_id, refresh_token.as_deref())
        .await?;
    Ok(NoContent)
}

/// POST /auth/logout-all
pub async fn logout_everywhere(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<NoContent> {
    AuthService::new(state.service_context())
        .logout_everywhere(auth.member_id)
        .await?;
    Ok(NoContent)
}

/// GET /auth/me
pub async fn current_member(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<CurrentMemberResponse>> {
    let response = AuthService::new(state.service_context())
        .current_member(&actor)
        .await?;
    Ok(Json(response))
}
