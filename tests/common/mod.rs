//! Test helpers for web integration tests.
//!
//! Builds the full router over in-memory stores and drives it with
//! `axum_test::TestServer`.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::json;

use intake::application::MemoryApplicationStore;
use intake::auth::provision_operator;
use intake::config::Config;
use intake::db::{MemoryOperatorStore, MemorySessionStore};
use intake::file::{MemoryObjectStore, UrlSigner};
use intake::web::{create_router, AppState, Stores};

pub const SIGNING_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const ADMIN_EMAIL: &str = "recruiter@example.org";
pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const COOKIE_NAME: &str = "intake_admin_session";

/// The router plus handles on every store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub applications: Arc<MemoryApplicationStore>,
    pub files: Arc<MemoryObjectStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub operators: Arc<MemoryOperatorStore>,
    pub signer: UrlSigner,
}

/// English messages, a generous login limit.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.signing_secret = SIGNING_SECRET.to_string();
    config.locale.language = "en".to_string();
    config.web.login_rate_limit = 1000;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let signer = UrlSigner::new(SIGNING_SECRET.as_bytes()).unwrap();
    let applications = Arc::new(MemoryApplicationStore::new());
    let files = Arc::new(MemoryObjectStore::new(signer.clone()));
    let sessions = Arc::new(MemorySessionStore::new());
    let operators = Arc::new(MemoryOperatorStore::new());

    provision_operator(operators.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    let stores = Stores {
        operators: operators.clone(),
        sessions: sessions.clone(),
        applications: applications.clone(),
        files: files.clone(),
    };
    let state = AppState::new(config, stores).unwrap();
    let server = TestServer::new(create_router(Arc::new(state))).unwrap();

    TestApp {
        server,
        applications,
        files,
        sessions,
        operators,
        signer,
    }
}

/// Every required text field filled in.
pub fn complete_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("nom", "Mbala"),
        ("postnom", "Ilunga"),
        ("prenom", "Grace"),
        ("sexe", "F"),
        ("dateNaissance", "2001-04-12"),
        ("telephone", "+243 810 000 000"),
        ("email", "grace@example.org"),
        ("adresse", "12 avenue Kasa-Vubu, Kinshasa"),
        ("etablissement", "ISTA Kinshasa"),
        ("filiere", "Architecture"),
        ("niveau", "L3"),
        ("annee", "2024-2025"),
        ("logiciels", r#"["AutoCAD","Revit"]"#),
        ("niveauOutils", "Intermédiaire"),
        ("motivation", "I want to design public buildings."),
        ("competences", "Drafting, 3D modelling"),
    ]
}

pub fn resume_part() -> Part {
    Part::bytes(b"%PDF-1.4 resume".to_vec())
        .file_name("cv.pdf")
        .mime_type("application/pdf")
}

pub fn portfolio_part() -> Part {
    Part::bytes(b"PK\x03\x04 portfolio".to_vec())
        .file_name("portfolio.zip")
        .mime_type("application/zip")
}

/// A complete submission with a résumé and no portfolio.
pub fn complete_form() -> MultipartForm {
    complete_fields()
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, value)| {
            form.add_text(name, value)
        })
        .add_part("cv", resume_part())
}

/// Submit a complete application and return its ID.
pub async fn submit(app: &TestApp) -> String {
    let response = app
        .server
        .post("/api/applications")
        .multipart(complete_form())
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Log in as the seeded operator. The response carries the session cookie.
pub async fn login(app: &TestApp) -> axum_test::TestResponse {
    let response = app
        .server
        .post("/api/admin/login")
        .json(&json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
        .await;
    response.assert_status_ok();
    response
}
