//! Admin console: HTML pages and the JSON review API.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::{ApplicationStatus, ReviewEntry};
use crate::datetime::format_datetime_default;
use crate::template::{TemplateContext, Value};
use crate::web::dto::{ApiResponse, ApplicationResponse, ReviewUpdateRequest, ValidatedJson};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::middleware::{CurrentOperator, PageOperator, REVIEW_PAGE};
use crate::IntakeError;

use super::AppState;

/// Render a template, falling back to a plain 500 if rendering fails.
fn render_page(
    state: &AppState,
    status: StatusCode,
    name: &str,
    context: &TemplateContext,
) -> Response {
    match state.templates.render(name, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(template = name, "Failed to render page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                state.i18n.t("error.internal").to_string(),
            )
                .into_response()
        }
    }
}

fn error_page(state: &AppState, status: StatusCode, message: &str) -> Response {
    let mut context = state.page_context();
    context.set("message", message);
    render_page(state, status, "error", &context)
}

/// Template value for one application card.
fn entry_value(entry: ReviewEntry, state: &AppState) -> Value {
    let ReviewEntry {
        application,
        resume_url,
        portfolio_url,
    } = entry;
    let status = application.status;
    let a = application.applicant;

    let statuses: Vec<Value> = ApplicationStatus::ALL
        .into_iter()
        .map(|option| {
            [
                ("value", Value::from(option.as_str())),
                ("label", Value::from(state.i18n.t(&option.label_key()))),
                ("selected", Value::from(option == status)),
            ]
            .into_iter()
            .collect()
        })
        .collect();

    [
        ("id", Value::from(application.id.to_string())),
        ("full_name", Value::from(a.full_name())),
        (
            "created_at",
            Value::from(format_datetime_default(
                &application.created_at,
                &state.config.server.timezone,
            )),
        ),
        ("sex", Value::from(a.sex)),
        ("birth_date", Value::from(a.birth_date)),
        ("phone", Value::from(a.phone)),
        ("email", Value::from(a.email)),
        ("address", Value::from(a.address)),
        ("institution", Value::from(a.institution)),
        ("field_of_study", Value::from(a.field_of_study)),
        ("level", Value::from(a.level)),
        ("academic_year", Value::from(a.academic_year)),
        ("tools", Value::from(a.tools)),
        ("tool_proficiency", Value::from(a.tool_proficiency)),
        ("motivation", Value::from(a.motivation)),
        ("skills", Value::from(a.skills)),
        ("status", Value::from(status.as_str())),
        ("status_label", Value::from(state.i18n.t(&status.label_key()))),
        ("notes", Value::from(application.notes)),
        ("resume_url", Value::from(resume_url)),
        (
            "has_portfolio",
            Value::from(application.portfolio_path.is_some()),
        ),
        ("portfolio_url", Value::from(portfolio_url)),
        ("statuses", Value::List(statuses)),
    ]
    .into_iter()
    .collect()
}

/// GET /admin/login - Login page.
///
/// Operators with a live session go straight to the review page.
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    operator: Option<PageOperator>,
) -> Response {
    if operator.is_some() {
        return Redirect::to(REVIEW_PAGE).into_response();
    }
    render_page(&state, StatusCode::OK, "login", &state.page_context())
}

/// GET /admin - Review page listing every application.
pub async fn review_page(
    State(state): State<Arc<AppState>>,
    PageOperator(operator): PageOperator,
) -> Response {
    let entries = match state.review.list().await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to list applications: {}", e);
            return error_page(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                state.i18n.t("error.listing"),
            );
        }
    };

    let mut context = state.page_context();
    context.set("operator", operator.email);
    context.set("total", entries.len());
    context.set(
        "applications",
        entries
            .into_iter()
            .map(|entry| entry_value(entry, &state))
            .collect::<Vec<_>>(),
    );

    render_page(&state, StatusCode::OK, "review", &context)
}

/// POST /admin/applications/{id} - Status and notes form.
pub async fn update_from_form(
    State(state): State<Arc<AppState>>,
    PageOperator(operator): PageOperator,
    Path(id): Path<Uuid>,
    form: Result<Form<ReviewUpdateRequest>, FormRejection>,
) -> Response {
    let Some(req) = form.ok().map(|Form(req)| req).filter(|req| req.validate().is_ok()) else {
        return error_page(&state, StatusCode::BAD_REQUEST, state.i18n.t("error.bad_request"));
    };

    match state.review.update(id, &req.status, req.notes.as_deref()).await {
        Ok(()) => {
            tracing::debug!(operator_id = operator.id, application_id = %id, "Review saved");
            Redirect::to(REVIEW_PAGE).into_response()
        }
        Err(IntakeError::Validation(_)) => {
            error_page(&state, StatusCode::BAD_REQUEST, state.i18n.t("error.invalid_status"))
        }
        Err(IntakeError::NotFound(_)) => {
            error_page(&state, StatusCode::NOT_FOUND, state.i18n.t("error.not_found"))
        }
        Err(e) => {
            tracing::error!(application_id = %id, "Failed to update application: {}", e);
            error_page(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                state.i18n.t("error.internal"),
            )
        }
    }
}

/// GET /api/admin/applications - List applications, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/applications",
    tag = "admin",
    responses(
        (status = 200, description = "Applications wrapped in `data`, with short-lived document links", body = Vec<ApplicationResponse>),
        (status = 401, description = "No valid session", body = ErrorBody),
        (status = 500, description = "Listing failed", body = ErrorBody)
    )
)]
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    _operator: CurrentOperator,
) -> Result<Json<ApiResponse<Vec<ApplicationResponse>>>, ApiError> {
    let entries = state
        .review
        .list()
        .await
        .map_err(|e| ApiError::from_intake(e, &state.i18n))?;

    let data = entries
        .into_iter()
        .map(|entry| ApplicationResponse::from_entry(entry, &state.i18n))
        .collect();
    Ok(Json(ApiResponse::new(data)))
}

/// PATCH /api/admin/applications/{id} - Update status and notes.
#[utoipa::path(
    patch,
    path = "/api/admin/applications/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ReviewUpdateRequest,
    responses(
        (status = 200, description = "Updated application wrapped in `data`", body = ApplicationResponse),
        (status = 400, description = "Unknown status or invalid notes", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody),
        (status = 404, description = "No such application", body = ErrorBody)
    )
)]
pub async fn update_application(
    State(state): State<Arc<AppState>>,
    CurrentOperator(operator): CurrentOperator,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReviewUpdateRequest>,
) -> Result<Json<ApiResponse<ApplicationResponse>>, ApiError> {
    state
        .review
        .update(id, &req.status, req.notes.as_deref())
        .await
        .map_err(|e| match e {
            IntakeError::Validation(_) => ApiError::validation(state.i18n.t("error.invalid_status")),
            other => ApiError::from_intake(other, &state.i18n),
        })?;
    tracing::debug!(operator_id = operator.id, application_id = %id, "Review saved");

    let entry = state
        .review
        .get(id)
        .await
        .map_err(|e| ApiError::from_intake(e, &state.i18n))?;
    Ok(Json(ApiResponse::new(ApplicationResponse::from_entry(
        entry,
        &state.i18n,
    ))))
}
