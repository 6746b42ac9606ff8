//! Router configuration.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    ApplicationResponse, FormOptionsResponse, LoginRequest, LoginResponse, ReviewUpdateRequest,
    SubmissionForm, SubmissionResponse,
};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::{self, AppState};
use super::middleware::{
    create_cors_layer, login_rate_limit, no_store_private, security_header_layers,
};

/// OpenAPI document for the JSON surface.
#[derive(OpenApi)]
#[openapi(
    info(title = "intake", description = "Recruitment intake and review API"),
    paths(
        handlers::applications::submit_application,
        handlers::applications::form_options,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::admin::list_applications,
        handlers::admin::update_application,
        handlers::files::download,
    ),
    components(schemas(
        SubmissionForm,
        SubmissionResponse,
        FormOptionsResponse,
        LoginRequest,
        LoginResponse,
        ApplicationResponse,
        ReviewUpdateRequest,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags(
        (name = "applications", description = "Public application form"),
        (name = "admin", description = "Operator login and review"),
        (name = "files", description = "Signed document downloads"),
    )
)]
pub struct ApiDoc;

/// Create the full router: public intake, admin console, downloads.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.storage.body_limit_bytes();

    let intake_routes = Router::new()
        .route(
            "/applications",
            post(handlers::submit_application).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/applications/options", get(handlers::form_options));

    let admin_api_routes = Router::new()
        .route(
            "/login",
            post(handlers::login).layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        )
        .route("/logout", post(handlers::logout))
        .route("/applications", get(handlers::list_applications))
        .route(
            "/applications/:id",
            axum::routing::patch(handlers::update_application),
        );

    let admin_pages = Router::new()
        .route("/", get(handlers::review_page))
        .route("/login", get(handlers::login_page))
        .route("/applications/:id", post(handlers::update_from_form));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/files/*path", get(handlers::download))
        .nest("/api", intake_routes.nest("/admin", admin_api_routes))
        .nest("/admin", admin_pages);

    if state.config.web.swagger_ui {
        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let [nosniff, frame_options, referrer_policy] = security_header_layers();

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&state.config.web.cors_origins))
                .layer(nosniff)
                .layer(frame_options)
                .layer(referrer_policy)
                .layer(middleware::from_fn(no_store_private))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
