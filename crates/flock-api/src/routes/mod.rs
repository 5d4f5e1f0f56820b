//! Route definitions
//!
//! Dashboard routes are mounted under /api/v1. The map's original
//! `/api/members-with-location` path is kept alongside them.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{
    auth, duties, groups, health, members, notifications, reports, sms, territories,
};
use crate::state::AppState;

/// Create the main API router (health routes are separate so they skip rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/members-with-location",
            get(members::members_with_location_legacy),
        )
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(member_routes())
        .merge(group_routes())
        .merge(territory_routes())
        .merge(duty_routes())
        .merge(report_routes())
        .merge(notification_routes())
        .merge(sms_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_everywhere))
        .route("/auth/me", get(auth::current_member))
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route("/members/locations", get(members::members_with_location))
        .route(
            "/members/:member_id",
            get(members::get_member).patch(members::update_member),
        )
        .route("/members/:member_id/role", put(members::change_role))
        .route("/members/:member_id/group", put(members::set_group))
}

fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/:group_id/members", get(groups::group_members))
}

fn territory_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/territories",
            get(territories::list_territories).post(territories::create_territory),
        )
        .route("/territories/analytics", get(territories::analytics))
        .route("/territories/assignments", get(territories::list_assignments))
        .route(
            "/territories/:territory_id/assignments",
            post(territories::assign_territory),
        )
        .route(
            "/assignments/:assignment_id/complete",
            post(territories::complete_assignment),
        )
}

fn duty_routes() -> Router<AppState> {
    Router::new()
        .route("/duties", get(duties::list_duties).post(duties::schedule_duty))
        .route("/duties/:duty_id", delete(duties::remove_duty))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports",
            get(reports::monthly_reports).post(reports::submit_report),
        )
        .route("/reports/me", get(reports::own_report))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications/vapid-public-key",
            get(notifications::vapid_public_key),
        )
        .route(
            "/notifications/subscription",
            get(notifications::current_subscription).post(notifications::subscribe),
        )
        .route("/notifications/send", post(notifications::send_notification))
}

fn sms_routes() -> Router<AppState> {
    Router::new()
        .route("/sms/reminders", post(sms::send_reminders))
        .route("/sms/logs", get(sms::sms_logs))
}
