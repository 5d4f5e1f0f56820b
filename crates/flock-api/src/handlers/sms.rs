//! SMS reminder handlers

use axum::{
    extract::{Query, State},
    Json,
};
use flock_service::dto::{MonthQuery, ReminderSummary, SendRemindersRequest, SmsLogResponse};
use flock_service::services::SmsService;

use crate::extractors::{CurrentActor, OptionalValidatedJson};
use crate::handlers::reports::month_or_previous;
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /sms/reminders
///
/// The body is optional; an empty body reminds for the previous month with
/// the default text.
pub async fn send_reminders(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    OptionalValidatedJson(request): OptionalValidatedJson<SendRemindersRequest>,
) -> ApiResult<Json<ReminderSummary>> {
    let summary = SmsService::new(state.service_context())
        .send_reminders(&actor, request.unwrap_or_default())
        .await?;
    Ok(Json(summary))
}

/// GET /sms/logs?month=YYYY-MM
pub async fn sms_logs(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MonthQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<Vec<SmsLogResponse>>> {
    let month = month_or_previous(query)?;
    let logs = SmsService::new(state.service_context())
        .logs(&actor, month)
        .await?;
    Ok(Json(logs))
}
