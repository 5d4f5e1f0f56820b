//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`, and `Validate` where the body
//! carries free-form input.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use flock_core::entities::DutyKind;
use flock_core::value_objects::{GroupId, MemberId, Role, ServiceMonth};

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// Member Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(length(min = 3, max = 32, message = "Phone must be 3-32 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Login password; members without one cannot sign in
    #[validate(length(max = 128, message = "Password must be at most 128 characters"))]
    pub password: Option<String>,

    pub role: Option<Role>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    pub group_id: Option<GroupId>,
}

/// Partial member update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: Option<String>,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    /// Remove the stored location
    #[serde(default)]
    pub clear_location: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetGroupRequest {
    /// `null` removes the member from any group
    pub group_id: Option<GroupId>,
}

// ============================================================================
// Group Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    pub overseer_id: Option<MemberId>,

    pub assistant_id: Option<MemberId>,
}

// ============================================================================
// Territory Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTerritoryRequest {
    #[validate(length(min = 1, max = 20, message = "Territory number must be 1-20 characters"))]
    pub number: String,

    #[validate(length(min = 1, max = 100, message = "Territory name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Locality must be at most 100 characters"))]
    pub locality: Option<String>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignTerritoryRequest {
    pub member_id: MemberId,
}

// ============================================================================
// Duty Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDutyRequest {
    pub kind: DutyKind,
    pub date: NaiveDate,
    pub member_id: MemberId,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

/// Date window for the duty roster
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DutyRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ============================================================================
// Report Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitReportRequest {
    pub month: ServiceMonth,
    pub participated: bool,

    #[serde(default)]
    #[validate(range(min = 0, max = 999, message = "Bible studies must be between 0 and 999"))]
    pub bible_studies: i32,

    #[validate(range(min = 0, max = 744, message = "Hours must be between 0 and 744"))]
    pub hours: Option<i32>,

    #[validate(length(max = 500, message = "Remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
}

/// `?month=YYYY-MM`; defaults to the previous month
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<ServiceMonth>,
}

// ============================================================================
// Notification Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PushKeysRequest {
    #[validate(length(min = 1, max = 256, message = "p256dh key is required"))]
    pub p256dh: String,

    #[validate(length(min = 1, max = 256, message = "auth secret is required"))]
    pub auth: String,
}

/// Browser `PushSubscription.toJSON()` shape
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(url(message = "Endpoint must be a URL"))]
    pub endpoint: String,

    #[validate(nested)]
    pub keys: PushKeysRequest,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendNotificationRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Body must be at most 500 characters"))]
    #[serde(default)]
    pub body: String,

    #[validate(url(message = "Link must be a URL"))]
    pub url: Option<String>,

    /// Restrict delivery to these members; everyone when absent
    pub member_ids: Option<Vec<MemberId>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SendRemindersRequest {
    /// Reporting month; defaults to the previous month
    pub month: Option<ServiceMonth>,

    /// Message override; `{name}` and `{month}` are substituted
    #[validate(length(min = 1, max = 320, message = "Message must be 1-320 characters"))]
    pub message: Option<String>,
}
