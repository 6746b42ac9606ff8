//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Admin login request.
///
/// Absent fields deserialize as empty so they fail validation with a 400.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Operator email.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(custom(function = "not_empty_trimmed"))]
    pub password: String,
}

/// Multipart body of the public application form.
///
/// Only describes the wire format for the OpenAPI document; the handler
/// reads parts one by one so files can be size-checked as they stream.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    pub nom: String,
    pub postnom: String,
    pub prenom: String,
    pub sexe: String,
    /// Date of birth, as typed.
    pub date_naissance: String,
    pub telephone: String,
    pub email: String,
    pub adresse: Option<String>,
    pub etablissement: String,
    pub filiere: String,
    pub niveau: String,
    pub annee: Option<String>,
    /// JSON array of software names, e.g. `["AutoCAD","Revit"]`.
    pub logiciels: Option<String>,
    pub niveau_outils: Option<String>,
    pub motivation: Option<String>,
    pub competences: Option<String>,
    /// Résumé file.
    #[schema(value_type = String, format = Binary)]
    pub cv: Vec<u8>,
    /// Optional portfolio file.
    #[schema(value_type = Option<String>, format = Binary)]
    pub portfolio: Option<Vec<u8>>,
}

/// Status and notes edit, sent as JSON or as an urlencoded form.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewUpdateRequest {
    /// One of `received`, `in_review`, `interview`, `rejected`, `accepted`.
    #[serde(default)]
    pub status: String,
    /// Free-text notes; blank clears them.
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"), length(max = 10000))]
    pub notes: Option<String>,
}

/// Query string of a signed download link.
///
/// Missing values fail signature verification rather than deserialization.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Expiry, unix seconds.
    #[serde(default)]
    pub expires: i64,
    /// Hex HMAC signature.
    #[serde(default)]
    pub signature: String,
}
