//! Public application form handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

use crate::application::{
    ApplicantDetails, Attachment, SubmissionError, PORTFOLIO_FIELD, RESUME_FIELD,
};
use crate::i18n::I18n;
use crate::web::dto::{ApiResponse, FormOptionsResponse, SubmissionForm, SubmissionResponse};
use crate::web::error::{ApiError, ErrorBody, ErrorCode};

use super::AppState;

/// Everything read from the multipart body.
#[derive(Default)]
struct Submission {
    fields: HashMap<String, String>,
    resume: Option<Attachment>,
    portfolio: Option<Attachment>,
}

fn multipart_error(e: MultipartError, i18n: &I18n) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large(i18n.t("error.payload_too_large"));
    }
    tracing::debug!("Rejected multipart body: {}", e);
    ApiError::bad_request(i18n.t("error.bad_request"))
}

async fn read_attachment(
    field: Field<'_>,
    max_bytes: usize,
    i18n: &I18n,
) -> Result<Option<Attachment>, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(|e| multipart_error(e, i18n))?;

    if bytes.len() > max_bytes {
        return Err(ApiError::payload_too_large(i18n.t("error.payload_too_large")));
    }

    Ok(Attachment::from_part(file_name, content_type, bytes.to_vec()))
}

async fn read_submission(
    mut multipart: Multipart,
    max_file_bytes: usize,
    i18n: &I18n,
) -> Result<Submission, ApiError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, i18n))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            RESUME_FIELD => {
                submission.resume = read_attachment(field, max_file_bytes, i18n).await?;
            }
            PORTFOLIO_FIELD => {
                submission.portfolio = read_attachment(field, max_file_bytes, i18n).await?;
            }
            _ => {
                let value = field.text().await.map_err(|e| multipart_error(e, i18n))?;
                submission.fields.insert(name, value);
            }
        }
    }

    Ok(submission)
}

fn submission_error(err: SubmissionError, i18n: &I18n) -> ApiError {
    match err {
        SubmissionError::MissingFields(fields) => {
            let message = i18n.t_with("error.missing_fields", &[("fields", &fields.join(", "))]);
            let details = fields
                .into_iter()
                .map(|field| (field, vec!["required".to_string()]))
                .collect();
            ApiError::with_details(ErrorCode::ValidationError, message, details)
        }
        SubmissionError::ResumeRequired => {
            let mut details = HashMap::new();
            details.insert(RESUME_FIELD.to_string(), vec!["required".to_string()]);
            ApiError::with_details(
                ErrorCode::ValidationError,
                i18n.t("error.resume_required"),
                details,
            )
        }
        SubmissionError::Backend(e) => {
            tracing::error!("Submission failed: {}", e);
            ApiError::internal(i18n.t("error.submission_failed"))
        }
    }
}

/// POST /api/applications - Submit an application.
///
/// Request body: multipart/form-data with the text fields, a `cv` file and
/// an optional `portfolio` file.
#[utoipa::path(
    post,
    path = "/api/applications",
    tag = "applications",
    request_body(
        content = SubmissionForm,
        content_type = "multipart/form-data",
        description = "Form fields, `cv` and optional `portfolio` files"
    ),
    responses(
        (status = 201, description = "Application recorded, wrapped in `data`", body = SubmissionResponse),
        (status = 400, description = "Missing fields or résumé", body = ErrorBody),
        (status = 413, description = "Upload too large", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionResponse>>), ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected intake request: {}", e);
        ApiError::bad_request(state.i18n.t("error.bad_request"))
    })?;

    let max_file_bytes = (state.config.storage.max_upload_size_mb * 1024 * 1024) as usize;
    let submission = read_submission(multipart, max_file_bytes, &state.i18n).await?;

    let applicant = ApplicantDetails::from_form_fields(&submission.fields);
    let id = state
        .intake
        .submit(applicant, submission.resume, submission.portfolio)
        .await
        .map_err(|e| submission_error(e, &state.i18n))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SubmissionResponse { id })),
    ))
}

/// GET /api/applications/options - Describe the application form.
#[utoipa::path(
    get,
    path = "/api/applications/options",
    tag = "applications",
    responses(
        (status = 200, description = "Form metadata, wrapped in `data`", body = FormOptionsResponse)
    )
)]
pub async fn form_options() -> Json<ApiResponse<FormOptionsResponse>> {
    Json(ApiResponse::new(FormOptionsResponse::current()))
}
