//! Integration tests for student records and the certificate gate.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_certificate_released_only_when_eligible() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let blocked = app
        .request("GET", "/api/student/certificate", None, Some(&student))
        .await;
    assert_eq!(blocked.status, StatusCode::NOT_FOUND);
    assert_eq!(blocked.error_code(), "NO_CERTIFICATE");

    let uploaded = app
        .upload(
            &format!("/api/admin/students/{id}/certificate"),
            &[],
            Some(("cert.pdf", "application/pdf", b"%PDF-certificate")),
            Some(&admin),
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::OK, "{:?}", uploaded.body);
    assert_eq!(uploaded.body["has_certificate"], true);

    let blocked = app
        .request("GET", "/api/student/certificate", None, Some(&student))
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert_eq!(blocked.error_code(), "SCORE_TOO_LOW");

    let academic = app
        .request(
            "PUT",
            &format!("/api/admin/students/{id}/academic"),
            Some(serde_json::json!({ "ms_word": 80, "ms_excel": 70 })),
            Some(&admin),
        )
        .await;
    assert_eq!(academic.status, StatusCode::OK);
    assert_eq!(academic.body["average_score"], 75.0);

    let blocked = app
        .request("GET", "/api/student/certificate", None, Some(&student))
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert_eq!(blocked.error_code(), "FEES_NOT_CLEARED");

    let finance = app
        .request(
            "PUT",
            &format!("/api/admin/students/{id}/finance"),
            Some(serde_json::json!({ "total_fees": 5000.0, "paid_amount": 5000.0 })),
            Some(&admin),
        )
        .await;
    assert_eq!(finance.status, StatusCode::OK);
    assert_eq!(finance.body["finance"]["is_cleared"], true);
    assert_eq!(finance.body["can_download_certificate"], true);

    let released = app
        .request("GET", "/api/student/certificate", None, Some(&student))
        .await;
    assert_eq!(released.status, StatusCode::OK);
    assert_eq!(released.bytes, b"%PDF-certificate");
    assert!(
        released
            .content_disposition
            .as_deref()
            .unwrap_or_default()
            .contains("cert.pdf")
    );

    let finance = app
        .request(
            "PUT",
            &format!("/api/admin/students/{id}/finance"),
            Some(serde_json::json!({ "paid_amount": 4000.0 })),
            Some(&admin),
        )
        .await;
    assert_eq!(finance.body["finance"]["balance"], 1000.0);
    assert_eq!(finance.body["blocker"], "FEES_NOT_CLEARED");

    let blocked = app
        .request("GET", "/api/student/certificate", None, Some(&student))
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
    assert_eq!(blocked.error_code(), "FEES_NOT_CLEARED");
}

#[tokio::test]
async fn test_score_out_of_range_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_student(&admin, "jdoe", "Initial123").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/admin/students/{id}/academic"),
            Some(serde_json::json!({ "ms_access": 101 })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error_code(), "OUT_OF_RANGE");
    assert_eq!(response.body["details"]["field"], "ms_access");
}

#[tokio::test]
async fn test_oversized_and_fractional_scores_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_student(&admin, "jdoe", "Initial123").await;

    for score in [serde_json::json!(40000), serde_json::json!(75.5)] {
        let response = app
            .request(
                "PUT",
                &format!("/api/admin/students/{id}/academic"),
                Some(serde_json::json!({ "ms_word": score })),
                Some(&admin),
            )
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{score}");
        assert_eq!(response.error_code(), "OUT_OF_RANGE");
        assert_eq!(response.body["details"]["field"], "ms_word");
    }

    let unchanged = app
        .request("GET", &format!("/api/admin/students/{id}"), None, Some(&admin))
        .await;
    assert!(unchanged.body["academic"]["ms_word"].is_null(), "{:?}", unchanged.body);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;

    let response = app
        .request(
            "POST",
            "/api/admin/students",
            Some(serde_json::json!({
                "username": "jdoe",
                "password": "Initial123",
                "full_name": "Another",
                "id_number": "2",
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "DUPLICATE_USERNAME");
}

#[tokio::test]
async fn test_admin_routes_forbidden_to_students() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let list = app
        .request("GET", "/api/admin/students", None, Some(&student))
        .await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let finance = app
        .request(
            "PUT",
            &format!("/api/admin/students/{id}/finance"),
            Some(serde_json::json!({ "paid_amount": 99999.0 })),
            Some(&student),
        )
        .await;
    assert_eq!(finance.status, StatusCode::FORBIDDEN);
    assert_eq!(finance.error_code(), "INSUFFICIENT_ROLE");
}

#[tokio::test]
async fn test_student_self_service() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let profile = app
        .request("GET", "/api/student/profile", None, Some(&student))
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["username"], "jdoe");
    assert_eq!(profile.body["can_download_certificate"], false);

    let updated = app
        .request(
            "PUT",
            "/api/student/parent-contacts",
            Some(serde_json::json!({
                "mother_name": "Jane Doe",
                "mother_phone": "0700000000",
            })),
            Some(&student),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["parent_contacts"]["mother_name"], "Jane Doe");

    let admin_profile = app
        .request("GET", "/api/student/profile", None, Some(&admin))
        .await;
    assert_eq!(admin_profile.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_student() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let id = app.create_student(&admin, "jdoe", "Initial123").await;

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/admin/students/{id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let fetched = app
        .request("GET", &format!("/api/admin/students/{id}"), None, Some(&admin))
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.error_code(), "STUDENT_PROFILE_NOT_FOUND");

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "jdoe", "password": "Initial123" })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::BAD_REQUEST);
}
