//! Field-service report handlers

use axum::{
    extract::{Query, State},
    Json,
};
use flock_core::ServiceMonth;
use flock_service::dto::{MonthQuery, MonthlyReportsResponse, ReportResponse, SubmitReportRequest};
use flock_service::services::ReportService;

use crate::extractors::{CurrentActor, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// `?month=` or the previous month
pub(crate) fn month_or_previous(
    query: Result<Query<MonthQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<ServiceMonth, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    Ok(query
        .month
        .unwrap_or_else(|| ServiceMonth::current().previous()))
}

/// POST /reports
pub async fn submit_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(request): ValidatedJson<SubmitReportRequest>,
) -> ApiResult<Created<Json<ReportResponse>>> {
    let report = ReportService::new(state.service_context())
        .submit(&actor, request)
        .await?;
    Ok(Created(Json(report)))
}

/// GET /reports/me?month=YYYY-MM
pub async fn own_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MonthQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<Option<ReportResponse>>> {
    let month = month_or_previous(query)?;
    let report = ReportService::new(state.service_context())
        .own(&actor, month)
        .await?;
    Ok(Json(report))
}

/// GET /reports?month=YYYY-MM
pub async fn monthly_reports(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MonthQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<MonthlyReportsResponse>> {
    let month = month_or_previous(query)?;
    let overview = ReportService::new(state.service_context())
        .for_month(&actor, month)
        .await?;
    Ok(Json(overview))
}
