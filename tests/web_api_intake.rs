//! Web API intake tests.
//!
//! Integration tests for the public application form.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use common::{complete_fields, complete_form, portfolio_part, resume_part, spawn_app, test_config};

#[tokio::test]
async fn test_submit_application_with_resume() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/applications")
        .multipart(complete_form())
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_str().unwrap();

    assert_eq!(app.applications.len().await, 1);
    assert_eq!(app.files.paths().await, vec![format!("{id}/cv.pdf")]);
}

#[tokio::test]
async fn test_submit_application_with_portfolio() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/applications")
        .multipart(complete_form().add_part("portfolio", portfolio_part()))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_str().unwrap();

    let mut paths = app.files.paths().await;
    paths.sort();
    assert_eq!(
        paths,
        vec![format!("{id}/cv.pdf"), format!("{id}/portfolio.zip")]
    );
}

#[tokio::test]
async fn test_missing_required_fields() {
    let app = spawn_app().await;

    let form = complete_fields()
        .into_iter()
        .filter(|(name, _)| *name != "nom" && *name != "email")
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name, value)
        })
        .add_part("cv", resume_part());

    let response = app.server.post("/api/applications").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("nom, email"));
    assert!(body["error"]["details"]["nom"].is_array());

    assert!(app.applications.is_empty().await);
    assert!(app.files.paths().await.is_empty());
}

#[tokio::test]
async fn test_blank_field_counts_as_missing() {
    let app = spawn_app().await;

    let form = complete_fields()
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            let value = if name == "telephone" { "   " } else { value };
            form.add_text(name, value)
        })
        .add_part("cv", resume_part());

    let response = app.server.post("/api/applications").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"]["details"]["telephone"].is_array());
}

#[tokio::test]
async fn test_resume_required() {
    let app = spawn_app().await;

    let form = complete_fields()
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name, value)
        });

    let response = app.server.post("/api/applications").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["cv"].is_array());
    assert!(app.applications.is_empty().await);
}

#[tokio::test]
async fn test_empty_file_input_is_no_resume() {
    let app = spawn_app().await;

    let form = complete_fields()
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name, value)
        })
        .add_part("cv", Part::bytes(Vec::new()).file_name(""));

    let response = app.server.post("/api/applications").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.files.paths().await.is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_generic_500() {
    let app = spawn_app().await;
    app.files.set_fail_puts(true);

    let response = app
        .server
        .post("/api/applications")
        .multipart(complete_form())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(app.applications.is_empty().await);
}

#[tokio::test]
async fn test_insert_failure_removes_uploads() {
    let app = spawn_app().await;
    app.applications.set_fail_inserts(true);

    let response = app
        .server
        .post("/api/applications")
        .multipart(complete_form().add_part("portfolio", portfolio_part()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.files.paths().await.is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let mut config = test_config();
    config.storage.max_upload_size_mb = 1;
    let app = common::spawn_app_with(config).await;

    let big = Part::bytes(vec![b'x'; 1024 * 1024 + 1])
        .file_name("cv.pdf")
        .mime_type("application/pdf");
    let form = complete_fields()
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name, value)
        })
        .add_part("cv", big);

    let response = app.server.post("/api/applications").multipart(form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.applications.is_empty().await);
}

#[tokio::test]
async fn test_non_multipart_body_is_400() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/applications")
        .json(&serde_json::json!({"nom": "Mbala"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_form_options() {
    let app = spawn_app().await;

    let response = app.server.get("/api/applications/options").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["resume_field"], "cv");
    assert_eq!(body["data"]["portfolio_field"], "portfolio");
    assert_eq!(body["data"]["required_fields"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(
        headers.get("referrer-policy").unwrap(),
        "strict-origin-when-cross-origin"
    );
}
