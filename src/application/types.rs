//! Application record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Just submitted.
    #[default]
    Received,
    /// Being read by staff.
    InReview,
    /// Invited to an interview.
    Interview,
    /// Turned down.
    Rejected,
    /// Offered a place.
    Accepted,
}

impl ApplicationStatus {
    /// Every status, in workflow order.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Received,
        ApplicationStatus::InReview,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    /// Database and form representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Received => "received",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    /// Translation key of the display label.
    pub fn label_key(&self) -> String {
        format!("status.{}", self.as_str())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// Everything the candidate fills in on the application form.
///
/// String fields are stored trimmed; blank optional fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ApplicantDetails {
    #[validate(length(min = 1, code = "required"))]
    pub last_name: String,
    #[validate(length(min = 1, code = "required"))]
    pub middle_name: String,
    #[validate(length(min = 1, code = "required"))]
    pub first_name: String,
    #[validate(length(min = 1, code = "required"))]
    pub sex: String,
    #[validate(length(min = 1, code = "required"))]
    pub birth_date: String,
    #[validate(length(min = 1, code = "required"))]
    pub phone: String,
    #[validate(length(min = 1, code = "required"))]
    pub email: String,
    pub address: Option<String>,
    #[validate(length(min = 1, code = "required"))]
    pub institution: String,
    #[validate(length(min = 1, code = "required"))]
    pub field_of_study: String,
    #[validate(length(min = 1, code = "required"))]
    pub level: String,
    pub academic_year: Option<String>,
    /// Selected design software.
    pub tools: Vec<String>,
    pub tool_proficiency: Option<String>,
    pub motivation: Option<String>,
    pub skills: Option<String>,
}

impl ApplicantDetails {
    /// Full display name.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A persisted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    /// Record ID, also the storage prefix of its documents.
    pub id: Uuid,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Form content.
    #[serde(flatten)]
    pub applicant: ApplicantDetails,
    /// Storage path of the résumé.
    pub resume_path: String,
    /// Storage path of the portfolio, if one was sent.
    pub portfolio_path: Option<String>,
    /// Review status.
    pub status: ApplicationStatus,
    /// Operator notes.
    pub notes: Option<String>,
}

/// Data for inserting an application.
#[derive(Debug, Clone)]
pub struct NewApplication {
    /// Pre-generated record ID.
    pub id: Uuid,
    /// Form content.
    pub applicant: ApplicantDetails,
    /// Storage path of the uploaded résumé.
    pub resume_path: String,
    /// Storage path of the uploaded portfolio.
    pub portfolio_path: Option<String>,
}

/// An operator's edit of an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    /// New status.
    pub status: ApplicationStatus,
    /// New notes, `None` clears them.
    pub notes: Option<String>,
}

/// Storage path of a document for an application.
///
/// ```
/// use intake::application::document_path;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// assert_eq!(
///     document_path(id, "cv", "pdf"),
///     "00000000-0000-0000-0000-000000000000/cv.pdf"
/// );
/// ```
pub fn document_path(id: Uuid, stem: &str, extension: &str) -> String {
    format!("{id}/{stem}.{extension}")
}
