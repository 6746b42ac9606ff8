//! Signed document downloads.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};

use crate::web::dto::DownloadQuery;
use crate::web::error::{ApiError, ErrorBody};
use crate::IntakeError;

use super::AppState;

/// Build a Content-Disposition header value for an attachment.
///
/// Control characters, quotes and backslashes are replaced in the plain
/// `filename` parameter; non-ASCII names also get an RFC 5987
/// `filename*` parameter.
pub fn content_disposition_header(filename: &str) -> String {
    let needs_encoding =
        !filename.is_ascii() || filename.chars().any(|c| c.is_control() || c == '"' || c == '\\');
    if !needs_encoding {
        return format!("attachment; filename=\"{filename}\"");
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{sanitized}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

/// GET /files/{path} - Download a stored document through a signed link.
#[utoipa::path(
    get,
    path = "/files/{path}",
    tag = "files",
    params(
        ("path" = String, Path, description = "Object path, e.g. `{id}/cv.pdf`"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream"),
        (status = 403, description = "Missing, invalid or expired signature", body = ErrorBody),
        (status = 404, description = "No such document", body = ErrorBody)
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.signer.verify(&path, query.expires, &query.signature) {
        tracing::debug!(path = %path, "Rejected download link");
        return Err(ApiError::forbidden(state.i18n.t("error.forbidden")));
    }

    let object = state.files.get(&path).await.map_err(|e| match e {
        IntakeError::NotFound(_) | IntakeError::Validation(_) => {
            ApiError::not_found(state.i18n.t("error.not_found"))
        }
        other => ApiError::from_intake(other, &state.i18n),
    })?;

    let filename = path.rsplit('/').next().unwrap_or(&path).to_string();
    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (
                header::CONTENT_DISPOSITION,
                content_disposition_header(&filename),
            ),
        ],
        object.bytes,
    ))
}
