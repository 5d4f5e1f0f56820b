//! API Integration Tests
//!
//! Every test starts its own server on an ephemeral port, backed by the
//! in-memory store. No external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use flock_core::value_objects::Role;
use integration_tests::{assert_error, assert_json, assert_status, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready_follows_storage() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health/ready").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    server.store.set_unavailable(true);
    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_login_and_me() {
    let server = TestServer::start().await.unwrap();
    let elder = server.seed_login("Ruth Miller", Role::Elder).unwrap();

    let login = LoginRequest::new(elder.email.clone().unwrap());
    let response = server.post("/api/v1/auth/login", &login).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.token_type, "Bearer");
    assert_eq!(auth.member.full_name, "Ruth Miller");
    assert_eq!(auth.member.role, "elder");

    let response = server
        .get_auth("/api/v1/auth/me", &auth.access_token)
        .await
        .unwrap();
    let me: MemberResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.id, elder.id.to_string());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = TestServer::start().await.unwrap();
    let member = server.seed_login("Paul Young", Role::Publisher).unwrap();

    let wrong_password = LoginRequest {
        email: member.email.clone().unwrap(),
        password: "not the password 1".to_string(),
    };
    let response = server.post("/api/v1/auth/login", &wrong_password).await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");

    // Unknown email gets the same answer
    let unknown = LoginRequest::new("nobody@example.org".to_string());
    let response = server.post("/api/v1/auth/login", &unknown).await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_refresh_rotates_session() {
    let server = TestServer::start().await.unwrap();
    let member = server.seed_login("Lydia Green", Role::Publisher).unwrap();

    let login = LoginRequest::new(member.email.clone().unwrap());
    let response = server.post("/api/v1/auth/login", &login).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let refresh = RefreshTokenRequest {
        refresh_token: auth.refresh_token.clone(),
    };
    let response = server.post("/api/v1/auth/refresh", &refresh).await.unwrap();
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_ne!(rotated.refresh_token, auth.refresh_token);

    // The old refresh token's session was revoked
    let response = server.post("/api/v1/auth/refresh", &refresh).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_logout_revokes_refresh() {
    let server = TestServer::start().await.unwrap();
    let member = server.seed_login("Silas Hart", Role::Publisher).unwrap();

    let login = LoginRequest::new(member.email.clone().unwrap());
    let response = server.post("/api/v1/auth/login", &login).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_empty_auth("/api/v1/auth/logout", &auth.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let refresh = RefreshTokenRequest {
        refresh_token: auth.refresh_token,
    };
    let response = server.post("/api/v1/auth/refresh", &refresh).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_missing_and_bad_tokens() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/api/v1/auth/me").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    let response = server.get_auth("/api/v1/auth/me", "garbage").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_TOKEN");
}

// ============================================================================
// Member Map Tests
// ============================================================================

#[tokio::test]
async fn test_members_with_location_end_to_end() {
    let server = TestServer::start().await.unwrap();
    let elder = server.seed_login("Anna Reed", Role::Elder).unwrap();
    server.seed_member("John Doe", Some((40.0, -75.0))).unwrap();
    server.seed_member("No Address", None).unwrap();
    let token = server.login_as(&elder).await.unwrap();

    let response = server
        .get_auth("/api/members-with-location", &token)
        .await
        .unwrap();
    let members: Vec<MemberLocation> = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].full_name, "John Doe");
    assert_eq!(
        members[0].location,
        Location {
            latitude: 40.0,
            longitude: -75.0
        }
    );
    assert_eq!(members[0].role, "publisher");

    // Same data on the versioned route
    let response = server
        .get_auth("/api/v1/members/locations", &token)
        .await
        .unwrap();
    let members: Vec<MemberLocation> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn test_members_with_location_requires_capability() {
    let server = TestServer::start().await.unwrap();
    let publisher = server.seed_login("Tim Cole", Role::Publisher).unwrap();
    let token = server.login_as(&publisher).await.unwrap();

    let response = server.get("/api/members-with-location").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    let response = server
        .get_auth("/api/members-with-location", &token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_members_with_location_storage_failure() {
    let server = TestServer::start().await.unwrap();
    let elder = server.seed_login("Mark Stone", Role::Elder).unwrap();
    let token = server.login_as(&elder).await.unwrap();

    server.store.set_unavailable(true);
    let response = server
        .get_auth("/api/members-with-location", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .unwrap();
    assert_eq!(body, json!({ "error": "Failed to fetch members" }));
}

#[tokio::test]
async fn test_members_with_location_storage_failure_still_requires_token() {
    let server = TestServer::start().await.unwrap();
    server.store.set_unavailable(true);

    let response = server.get("/api/members-with-location").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");

    // The versioned route keeps the standard envelope
    server.store.set_unavailable(false);
    let elder = server.seed_login("Ruth Hale", Role::Elder).unwrap();
    let token = server.login_as(&elder).await.unwrap();
    server.store.set_unavailable(true);
    let response = server
        .get_auth("/api/v1/members/locations", &token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .unwrap();
    assert_eq!(code, "DATA_ACCESS_ERROR");
}

// ============================================================================
// Member Management Tests
// ============================================================================

#[tokio::test]
async fn test_create_member_with_location() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let token = server.login_as(&admin).await.unwrap();

    let request = CreateMemberRequest {
        latitude: Some(51.5),
        longitude: Some(-0.12),
        ..CreateMemberRequest::unique()
    };
    let response = server
        .post_auth("/api/v1/members", &token, &request)
        .await
        .unwrap();
    let created: MemberResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.full_name, request.full_name);
    assert_eq!(
        created.location,
        Some(Location {
            latitude: 51.5,
            longitude: -0.12
        })
    );

    let response = server
        .get_auth(&format!("/api/v1/members/{}", created.id), &token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_half_location_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let token = server.login_as(&admin).await.unwrap();
    let before = server.store.member_count();

    let request = CreateMemberRequest {
        latitude: Some(40.0),
        ..CreateMemberRequest::unique()
    };
    let response = server
        .post_auth("/api/v1/members", &token, &request)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(server.store.member_count(), before);
}

#[tokio::test]
async fn test_bad_member_id_in_path() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let token = server.login_as(&admin).await.unwrap();

    let response = server
        .get_auth("/api/v1/members/not-a-uuid", &token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_clear_location() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let member = server.seed_member("Moving Away", Some((10.0, 10.0))).unwrap();
    let token = server.login_as(&admin).await.unwrap();

    let response = server
        .patch_auth(
            &format!("/api/v1/members/{}", member.id),
            &token,
            &json!({ "clear_location": true }),
        )
        .await
        .unwrap();
    let updated: MemberResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(updated.location.is_none());
}

// ============================================================================
// Notification Tests
// ============================================================================

#[tokio::test]
async fn test_vapid_public_key_is_public() {
    let server = TestServer::start().await.unwrap();
    let response = server
        .get("/api/v1/notifications/vapid-public-key")
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let key = body["public_key"].as_str().unwrap();
    assert!(!key.is_empty());
    assert!(!key.contains('='));
}

#[tokio::test]
async fn test_subscribe_and_notify() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let publisher = server.seed_login("Grace Lane", Role::Publisher).unwrap();
    let admin_token = server.login_as(&admin).await.unwrap();
    let publisher_token = server.login_as(&publisher).await.unwrap();

    let subscribe = SubscribeRequest::unique();
    let response = server
        .post_auth("/api/v1/notifications/subscription", &publisher_token, &subscribe)
        .await
        .unwrap();
    let subscription: SubscriptionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(subscription.is_active);
    assert_eq!(subscription.endpoint, subscribe.endpoint);

    // Subscribing again keeps one subscription per member
    let response = server
        .post_auth("/api/v1/notifications/subscription", &publisher_token, &subscribe)
        .await
        .unwrap();
    let again: SubscriptionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(again.id, subscription.id);

    let response = server
        .post_auth(
            "/api/v1/notifications/send",
            &admin_token,
            &SendNotificationRequest::reminder(),
        )
        .await
        .unwrap();
    let summary: NotificationSummary = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        summary,
        NotificationSummary {
            attempted: 1,
            delivered: 1,
            deactivated: 0
        }
    );
    assert_eq!(server.push.delivered(), vec![subscribe.endpoint.clone()]);
}

#[tokio::test]
async fn test_expired_subscription_is_deactivated() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let publisher = server.seed_login("Eli Ford", Role::Publisher).unwrap();
    let admin_token = server.login_as(&admin).await.unwrap();
    let publisher_token = server.login_as(&publisher).await.unwrap();

    let subscribe = SubscribeRequest::unique();
    server
        .post_auth("/api/v1/notifications/subscription", &publisher_token, &subscribe)
        .await
        .unwrap();
    server.push.expire(&subscribe.endpoint);

    let response = server
        .post_auth(
            "/api/v1/notifications/send",
            &admin_token,
            &SendNotificationRequest::reminder(),
        )
        .await
        .unwrap();
    let summary: NotificationSummary = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(summary.deactivated, 1);

    let response = server
        .get_auth("/api/v1/notifications/subscription", &publisher_token)
        .await
        .unwrap();
    let current: SubscriptionResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!current.is_active);
}

#[tokio::test]
async fn test_publisher_cannot_broadcast() {
    let server = TestServer::start().await.unwrap();
    let publisher = server.seed_login("Ivy Hale", Role::Publisher).unwrap();
    let token = server.login_as(&publisher).await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/notifications/send",
            &token,
            &SendNotificationRequest::reminder(),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

// ============================================================================
// SMS Reminder Tests
// ============================================================================

#[tokio::test]
async fn test_reminders_without_body() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let token = server.login_as(&admin).await.unwrap();

    let response = server
        .post_empty_auth("/api/v1/sms/reminders", &token)
        .await
        .unwrap();
    let summary: ReminderSummary = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(summary.sent, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.month.len(), 7);
}

#[tokio::test]
async fn test_sms_logs_reject_bad_month() {
    let server = TestServer::start().await.unwrap();
    let admin = server.seed_login("Site Admin", Role::Admin).unwrap();
    let token = server.login_as(&admin).await.unwrap();

    let response = server
        .get_auth("/api/v1/sms/logs?month=2024-13", &token)
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Territory Tests
// ============================================================================

#[tokio::test]
async fn test_territory_checkout_flow() {
    let server = TestServer::start().await.unwrap();
    let elder = server.seed_login("Abel Ward", Role::Elder).unwrap();
    let worker = server.seed_member("Field Worker", None).unwrap();
    let token = server.login_as(&elder).await.unwrap();

    let response = server
        .post_auth(
            "/api/v1/territories",
            &token,
            &json!({ "number": "12", "name": "Riverside" }),
        )
        .await
        .unwrap();
    let territory: Value = assert_json(response, StatusCode::CREATED).await.unwrap();
    let territory_id = territory["id"].as_str().unwrap();

    let assign_path = format!("/api/v1/territories/{territory_id}/assignments");
    let body = json!({ "member_id": worker.id });
    let response = server.post_auth(&assign_path, &token, &body).await.unwrap();
    let assignment: Value = assert_json(response, StatusCode::CREATED).await.unwrap();

    // Already checked out
    let response = server.post_auth(&assign_path, &token, &body).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();

    let complete_path = format!(
        "/api/v1/assignments/{}/complete",
        assignment["id"].as_str().unwrap()
    );
    let response = server
        .post_empty_auth(&complete_path, &token)
        .await
        .unwrap();
    let done: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!done["completed_at"].is_null());

    let response = server
        .get_auth("/api/v1/territories/analytics", &token)
        .await
        .unwrap();
    let stats: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["assigned"], 0);
}
