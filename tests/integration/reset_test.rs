//! Integration tests for the admin-approved password reset workflow.

use http::StatusCode;

use crate::helpers::TestApp;

async fn forgot(app: &TestApp, username: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "username": username })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["request_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_reset_flow() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;

    let request_id = forgot(&app, "jdoe").await;

    let pending = app
        .request("GET", "/api/admin/password-resets", None, Some(&admin))
        .await;
    assert_eq!(pending.status, StatusCode::OK);
    let list = pending.body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["student_username"], "jdoe");
    assert_eq!(list[0]["status"], "pending");
    assert!(list[0].get("code").is_none());

    let approved = app
        .request(
            "PUT",
            &format!("/api/admin/password-resets/{request_id}/approve"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    let code = approved.body["otp_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let redeemed = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(serde_json::json!({
                "username": "jdoe",
                "reset_code": code,
                "new_password": "Fresh12345",
            })),
            None,
        )
        .await;
    assert_eq!(redeemed.status, StatusCode::OK);

    app.login("jdoe", "Fresh12345").await;

    let reused = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(serde_json::json!({
                "username": "jdoe",
                "otp_code": code,
                "new_password": "Another123",
            })),
            None,
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.error_code(), "INVALID_OR_EXPIRED_CODE");

    let pending = app
        .request("GET", "/api/admin/password-resets", None, Some(&admin))
        .await;
    assert!(pending.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_code_is_uniform_failure() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    forgot(&app, "jdoe").await;

    let response = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(serde_json::json!({
                "username": "jdoe",
                "reset_code": "not-a-code",
                "new_password": "Fresh12345",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_OR_EXPIRED_CODE");
    app.login("jdoe", "Initial123").await;
}

#[tokio::test]
async fn test_reject_then_approve_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let request_id = forgot(&app, "jdoe").await;

    let rejected = app
        .request(
            "PUT",
            &format!("/api/admin/password-resets/{request_id}/reject"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::OK);
    assert_eq!(rejected.body["status"], "rejected");

    let approved = app
        .request(
            "PUT",
            &format!("/api/admin/password-resets/{request_id}/approve"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(approved.status, StatusCode::CONFLICT);
    assert_eq!(approved.error_code(), "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_forgot_password_for_unknown_student() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/forgot-password",
            Some(serde_json::json!({ "username": "ghost" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn test_approve_unknown_and_malformed_ids() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let unknown = app
        .request(
            "PUT",
            &format!(
                "/api/admin/password-resets/{}/approve",
                uuid::Uuid::new_v4()
            ),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error_code(), "RESET_REQUEST_NOT_FOUND");

    let malformed = app
        .request(
            "PUT",
            "/api/admin/password-resets/not-a-uuid/approve",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(malformed.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(malformed.body["details"]["field"], "id");
}

#[tokio::test]
async fn test_student_cannot_see_reset_queue() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let response = app
        .request("GET", "/api/admin/password-resets", None, Some(&student))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_deleted_student_code_does_not_carry_to_new_account() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let old_id = app.create_student(&admin, "jdoe", "Initial123").await;

    let request_id = forgot(&app, "jdoe").await;
    let approved = app
        .request(
            "PUT",
            &format!("/api/admin/password-resets/{request_id}/approve"),
            None,
            Some(&admin),
        )
        .await;
    let code = approved.body["otp_code"].as_str().unwrap().to_string();

    let deleted = app
        .request("DELETE", &format!("/api/admin/students/{old_id}"), None, Some(&admin))
        .await;
    assert!(deleted.status.is_success(), "{:?}", deleted.body);
    app.create_student(&admin, "jdoe", "Second123").await;

    let redeemed = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(serde_json::json!({
                "username": "jdoe",
                "otp_code": code,
                "new_password": "Hijacked123",
            })),
            None,
        )
        .await;
    assert_eq!(redeemed.status, StatusCode::BAD_REQUEST);
    assert_eq!(redeemed.error_code(), "INVALID_OR_EXPIRED_CODE");
    app.login("jdoe", "Second123").await;
}
