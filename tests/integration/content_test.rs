//! Integration tests for eulogies and downloads.

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_eulogy_upload_and_public_listing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let uploaded = app
        .upload(
            "/api/admin/eulogies",
            &[("title", "In memory"), ("description", "A tribute")],
            Some(("tribute.pdf", "application/pdf", b"eulogy-bytes")),
            Some(&admin),
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{:?}", uploaded.body);
    assert_eq!(uploaded.body["kind"], "eulogy");
    assert_eq!(uploaded.body["audience"], "public");
    let id = uploaded.body["id"].as_str().unwrap().to_string();

    let listed = app.request("GET", "/api/eulogies", None, None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let items = listed.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "In memory");
    assert_eq!(items[0]["is_visible"], true);
    let days = items[0]["days_remaining"].as_i64().unwrap();
    assert!((6..=7).contains(&days));

    let fetched = app
        .request("GET", &format!("/api/eulogies/{id}/download"), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.bytes, b"eulogy-bytes");
}

#[tokio::test]
async fn test_download_counts_fetches() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let uploaded = app
        .upload(
            "/api/admin/downloads",
            &[("title", "Syllabus")],
            Some(("syllabus.pdf", "application/pdf", b"syllabus")),
            Some(&admin),
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let id = uploaded.body["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let fetched = app
            .request("GET", &format!("/api/downloads/{id}/download"), None, None)
            .await;
        assert_eq!(fetched.status, StatusCode::OK);
    }

    let listed = app
        .request("GET", "/api/admin/downloads", None, Some(&admin))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body[0]["download_count"], 2);
}

#[tokio::test]
async fn test_student_only_download_hidden_from_anonymous() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let uploaded = app
        .upload(
            "/api/admin/downloads",
            &[("title", "Exam notes"), ("file_type", "private")],
            Some(("notes.txt", "text/plain", b"notes")),
            Some(&admin),
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    assert_eq!(uploaded.body["audience"], "students");
    let id = uploaded.body["id"].as_str().unwrap().to_string();

    let anonymous = app.request("GET", "/api/downloads", None, None).await;
    assert!(anonymous.body.as_array().unwrap().is_empty());

    let fetched = app
        .request("GET", &format!("/api/downloads/{id}/download"), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.error_code(), "CONTENT_ITEM_NOT_FOUND");

    let for_student = app
        .request("GET", "/api/student/downloads", None, Some(&student))
        .await;
    assert_eq!(for_student.status, StatusCode::OK);
    assert_eq!(for_student.body.as_array().unwrap().len(), 1);

    let fetched = app
        .request(
            "GET",
            &format!("/api/downloads/{id}/download"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_requires_title_and_file() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let no_title = app
        .upload(
            "/api/admin/eulogies",
            &[],
            Some(("tribute.pdf", "application/pdf", b"bytes")),
            Some(&admin),
        )
        .await;
    assert_eq!(no_title.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(no_title.body["details"]["field"], "title");

    let no_file = app
        .upload(
            "/api/admin/eulogies",
            &[("title", "In memory")],
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(no_file.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(no_file.body["details"]["field"], "file");
}

#[tokio::test]
async fn test_delete_content_and_kind_mismatch() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let uploaded = app
        .upload(
            "/api/admin/eulogies",
            &[("title", "In memory")],
            Some(("tribute.pdf", "application/pdf", b"bytes")),
            Some(&admin),
        )
        .await;
    let id = uploaded.body["id"].as_str().unwrap().to_string();

    let wrong_kind = app
        .request(
            "DELETE",
            &format!("/api/admin/downloads/{id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(wrong_kind.status, StatusCode::NOT_FOUND);

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/admin/eulogies/{id}"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let listed = app.request("GET", "/api/eulogies", None, None).await;
    assert!(listed.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_student_cannot_upload_content() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    app.create_student(&admin, "jdoe", "Initial123").await;
    let student = app.login("jdoe", "Initial123").await;

    let response = app
        .upload(
            "/api/admin/eulogies",
            &[("title", "Nope")],
            Some(("x.txt", "text/plain", b"x")),
            Some(&student),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
