//! Push notification handlers

use axum::{extract::State, http::header::USER_AGENT, http::HeaderMap, Json};
use flock_service::dto::{
    NotificationSummary, SendNotificationRequest, SubscribeRequest, SubscriptionResponse,
    VapidPublicKeyResponse,
};
use flock_service::services::{NotificationService, SubscriptionService};

use crate::extractors::{CurrentActor, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /notifications/vapid-public-key
pub async fn vapid_public_key(
    State(state): State<AppState>,
) -> ApiResult<Json<VapidPublicKeyResponse>> {
    let key = SubscriptionService::new(state.service_context()).vapid_public_key()?;
    Ok(Json(key))
}

/// POST /notifications/subscription
pub async fn subscribe(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<SubscribeRequest>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let subscription = SubscriptionService::new(state.service_context())
        .subscribe(&actor, request, user_agent)
        .await?;
    Ok(Json(subscription))
}

/// GET /notifications/subscription
pub async fn current_subscription(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Option<SubscriptionResponse>>> {
    let subscription = SubscriptionService::new(state.service_context())
        .current(&actor)
        .await?;
    Ok(Json(subscription))
}

/// POST /notifications/send
pub async fn send_notification(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<SendNotificationRequest>,
) -> ApiResult<Json<NotificationSummary>> {
    let summary = NotificationService::new(state.service_context())
        .notify(&actor, request)
        .await?;
    Ok(Json(summary))
}
