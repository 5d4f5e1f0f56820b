//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use flock_core::entities::DutyKind;
use flock_core::value_objects::{
    AssignmentId, Capabilities, DutyId, GeoLocation, GroupId, MemberId, ReportId, Role,
    ServiceMonth, SmsLogId, SubscriptionId, TerritoryId,
};

// ============================================================================
// Common Response Types
// ============================================================================

/// Offset-paginated list
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        let has_more = i64::try_from(data.len()).unwrap_or(i64::MAX) >= limit;
        Self {
            data,
            pagination: PaginationMeta {
                limit,
                offset,
                has_more,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    /// A full page was returned, so another may follow
    pub has_more: bool,
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub member: CurrentMemberResponse,
}

/// The signed-in member and what they may do
#[derive(Debug, Serialize)]
pub struct CurrentMemberResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub capabilities: Capabilities,
}

// ============================================================================
// Member / Group Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub location: Option<GeoLocation>,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub overseer_id: Option<MemberId>,
    pub assistant_id: Option<MemberId>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Territory Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TerritoryResponse {
    pub id: TerritoryId,
    pub number: String,
    pub name: String,
    pub locality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentResponse {
    pub id: AssignmentId,
    pub territory_id: TerritoryId,
    pub member_id: MemberId,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}

// ============================================================================
// Duty / Report Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DutyResponse {
    pub id: DutyId,
    pub kind: DutyKind,
    pub date: NaiveDate,
    pub member_id: MemberId,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse {
    pub id: ReportId,
    pub member_id: MemberId,
    pub month: ServiceMonth,
    pub participated: bool,
    pub bible_studies: i32,
    pub hours: Option<i32>,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Reports received for a month against the roster
#[derive(Debug, Serialize)]
pub struct MonthlyReportsResponse {
    pub month: ServiceMonth,
    pub reports: Vec<ReportResponse>,
    pub missing: Vec<MemberId>,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    pub endpoint: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

/// Outcome of a push fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub deactivated: usize,
    /// Outcomes that could not be written back to storage
    pub unrecorded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VapidPublicKeyResponse {
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmsLogResponse {
    pub id: SmsLogId,
    pub recipient_id: MemberId,
    pub phone: String,
    pub message: String,
    pub sender_id: MemberId,
    pub month: ServiceMonth,
    pub sent_at: DateTime<Utc>,
}

/// Outcome of a report-reminder run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSummary {
    pub month: ServiceMonth,
    pub sent: usize,
    pub already_reported: usize,
    pub already_messaged: usize,
    pub failed: usize,
    /// Sent, but the log entry could not be written
    pub unlogged: usize,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// State of one dependency
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: Vec<ComponentHealth>,
}

impl ReadinessResponse {
    /// Build from `(component, healthy)` pairs
    pub fn from_checks(checks: Vec<(&str, bool)>) -> Self {
        let all_healthy = checks.iter().all(|(_, healthy)| *healthy);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: checks
                .into_iter()
                .map(|(name, healthy)| ComponentHealth {
                    name: name.to_string(),
                    status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
