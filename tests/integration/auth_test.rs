//! Integration tests for authentication flow.

use http::StatusCode;

use crate::helpers::{ADMIN_PASSWORD, TestApp};

#[tokio::test]
async fn test_bootstrap_admin_can_login() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "admin",
                "password": ADMIN_PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.get("access_token").is_some());
    assert_eq!(response.body["token_type"], "bearer");
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "admin",
                "password": "WrongPass1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_user_looks_like_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "nobody",
                "password": "Whatever1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_missing_field() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "admin", "password": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "MISSING_FIELD");
    assert_eq!(response.body["details"]["field"], "password");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/auth/me", None, Some("not.a.jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_me_returns_account() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "admin");
    assert_eq!(response.body["role"], "admin");
    assert!(response.body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let token = app.login("jdoe", "Initial123").await;

    let response = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(serde_json::json!({ "new_password": "Changed456" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    app.login("jdoe", "Changed456").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "jdoe", "password": "Initial123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let me = app
        .request(
            "GET",
            "/api/auth/me",
            None,
            Some(&app.login("jdoe", "Changed456").await),
        )
        .await;
    assert_eq!(me.body["is_first_login"], false);
}

#[tokio::test]
async fn test_change_password_enforces_policy() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(serde_json::json!({ "new_password": "short" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "OUT_OF_RANGE");
}

#[tokio::test]
async fn test_change_password_requires_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(serde_json::json!({ "new_password": "Changed456" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_missing_body() {
    let app = TestApp::new().await;

    let req = http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), req)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert!(response.body.get("version").is_some());
}
