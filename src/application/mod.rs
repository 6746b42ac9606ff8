//! Applications: the public intake and the operator review.

mod form;
mod memory;
mod repository;
mod review;
mod service;
mod types;

pub use form::{
    parse_tools, Attachment, FALLBACK_EXTENSION, PORTFOLIO_FIELD, RECOMMENDED_TEXT_LENGTH,
    REQUIRED_FIELDS, RESUME_FIELD, SOFTWARE_OPTIONS,
};
pub use memory::MemoryApplicationStore;
pub use repository::SqliteApplicationStore;
pub use review::{ReviewEntry, ReviewService};
pub use service::{IntakeService, SubmissionError};
pub use types::{
    document_path, ApplicantDetails, Application, ApplicationStatus, NewApplication,
    ReviewUpdate,
};
