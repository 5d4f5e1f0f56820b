//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AssignTerritoryRequest, ChangeRoleRequest, CreateDutyRequest, CreateGroupRequest,
    CreateMemberRequest, CreateTerritoryRequest, DutyRangeQuery, LoginRequest, LogoutRequest,
    MonthQuery, PushKeysRequest, RefreshTokenRequest, SendNotificationRequest,
    SendRemindersRequest, SetGroupRequest, SubmitReportRequest, SubscribeRequest,
    UpdateMemberRequest,
};

pub use responses::{
    AssignmentResponse, AuthResponse, ComponentHealth, CurrentMemberResponse,
    DutyResponse, GroupResponse, HealthResponse, MemberResponse, MonthlyReportsResponse,
    NotificationSummary, PaginatedResponse, PaginationMeta, ReadinessResponse, ReminderSummary,
    ReportResponse, SmsLogResponse, SubscriptionResponse, TerritoryResponse,
    VapidPublicKeyResponse,
};
