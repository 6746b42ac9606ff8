//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::{
    ReviewEntry, PORTFOLIO_FIELD, RECOMMENDED_TEXT_LENGTH, REQUIRED_FIELDS, RESUME_FIELD,
    SOFTWARE_OPTIONS,
};
use crate::i18n::I18n;

/// Success envelope: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Accepted submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    /// New application ID.
    pub id: Uuid,
}

/// Successful login. The session travels in the cookie.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Always true.
    pub ok: bool,
}

/// Form metadata for the public intake client.
#[derive(Debug, Serialize, ToSchema)]
pub struct FormOptionsResponse {
    /// Multipart names of the required text fields.
    pub required_fields: Vec<String>,
    /// Software the candidate can pick from (`logiciels`).
    pub software: Vec<String>,
    /// Suggested minimum length of free-text answers.
    pub recommended_text_length: usize,
    /// Multipart name of the résumé part.
    pub resume_field: String,
    /// Multipart name of the portfolio part.
    pub portfolio_field: String,
}

impl FormOptionsResponse {
    /// Describe the current form.
    pub fn current() -> Self {
        Self {
            required_fields: REQUIRED_FIELDS
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            software: SOFTWARE_OPTIONS.iter().map(|s| s.to_string()).collect(),
            recommended_text_length: RECOMMENDED_TEXT_LENGTH,
            resume_field: RESUME_FIELD.to_string(),
            portfolio_field: PORTFOLIO_FIELD.to_string(),
        }
    }
}

/// Application as seen by an operator.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_name: String,
    pub middle_name: String,
    pub first_name: String,
    pub sex: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
    pub institution: String,
    pub field_of_study: String,
    pub level: String,
    pub academic_year: Option<String>,
    pub tools: Vec<String>,
    pub tool_proficiency: Option<String>,
    pub motivation: Option<String>,
    pub skills: Option<String>,
    /// Status value, e.g. `in_review`.
    pub status: String,
    /// Localized status label.
    pub status_label: String,
    pub notes: Option<String>,
    /// Signed résumé link, short-lived.
    pub resume_url: Option<String>,
    /// Signed portfolio link, short-lived.
    pub portfolio_url: Option<String>,
}

impl ApplicationResponse {
    /// Build from a review entry.
    pub fn from_entry(entry: ReviewEntry, i18n: &I18n) -> Self {
        let ReviewEntry {
            application,
            resume_url,
            portfolio_url,
        } = entry;
        let a = application.applicant;
        Self {
            id: application.id,
            created_at: application.created_at,
            last_name: a.last_name,
            middle_name: a.middle_name,
            first_name: a.first_name,
            sex: a.sex,
            birth_date: a.birth_date,
            phone: a.phone,
            email: a.email,
            address: a.address,
            institution: a.institution,
            field_of_study: a.field_of_study,
            level: a.level,
            academic_year: a.academic_year,
            tools: a.tools,
            tool_proficiency: a.tool_proficiency,
            motivation: a.motivation,
            skills: a.skills,
            status: application.status.as_str().to_string(),
            status_label: i18n.t(&application.status.label_key()).to_string(),
            notes: application.notes,
            resume_url,
            portfolio_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let json = serde_json::to_value(ApiResponse::new(LoginResponse { ok: true })).unwrap();
        assert_eq!(json, serde_json::json!({"data": {"ok": true}}));
    }

    #[test]
    fn test_form_options() {
        let options = FormOptionsResponse::current();
        assert_eq!(options.required_fields.len(), 10);
        assert_eq!(options.required_fields[0], "nom");
        assert!(options.software.contains(&"Revit".to_string()));
        assert_eq!(options.resume_field, "cv");
    }
}
