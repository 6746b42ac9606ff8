//! Intake of public submissions.
//!
//! A submission touches two independent backends: documents go to object
//! storage, the record goes to the application store. There is no shared
//! transaction, so a failed insert is compensated by removing whatever was
//! uploaded. Removal is attempted for every upload; the ones that could not
//! be removed are logged for manual cleanup.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::form::Attachment;
use super::types::{document_path, ApplicantDetails, Application, NewApplication};
use crate::db::ApplicationStore;
use crate::file::ObjectStore;
use crate::IntakeError;

/// Submission errors.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// Required text fields are empty. Holds their form names.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// No résumé file was attached.
    #[error("resume required")]
    ResumeRequired,

    /// Storage or database failure.
    #[error(transparent)]
    Backend(#[from] IntakeError),
}

/// Accepts applications: uploads documents then records the submission.
#[derive(Clone)]
pub struct IntakeService {
    applications: Arc<dyn ApplicationStore>,
    files: Arc<dyn ObjectStore>,
}

impl IntakeService {
    /// Create a service over the given stores.
    pub fn new(applications: Arc<dyn ApplicationStore>, files: Arc<dyn ObjectStore>) -> Self {
        Self {
            applications,
            files,
        }
    }

    /// Validate and store a submission. Returns the new record ID.
    pub async fn submit(
        &self,
        applicant: ApplicantDetails,
        resume: Option<Attachment>,
        portfolio: Option<Attachment>,
    ) -> Result<Uuid, SubmissionError> {
        let missing = applicant.missing_fields();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingFields(missing));
        }
        let resume = resume.ok_or(SubmissionError::ResumeRequired)?;

        let id = Uuid::new_v4();
        let mut uploaded = Vec::new();

        match self
            .store(id, applicant, &resume, portfolio.as_ref(), &mut uploaded)
            .await
        {
            Ok(application) => {
                info!(
                    application_id = %application.id,
                    documents = uploaded.len(),
                    "Application received"
                );
                Ok(application.id)
            }
            Err(e) => {
                warn!(application_id = %id, "Submission failed: {}", e);
                self.compensate(id, &uploaded).await;
                Err(e.into())
            }
        }
    }

    async fn store(
        &self,
        id: Uuid,
        applicant: ApplicantDetails,
        resume: &Attachment,
        portfolio: Option<&Attachment>,
        uploaded: &mut Vec<String>,
    ) -> Result<Application, IntakeError> {
        let resume_path = document_path(id, "cv", &resume.extension());
        self.files
            .put(&resume_path, &resume.bytes, &resume.content_type())
            .await?;
        uploaded.push(resume_path.clone());

        let portfolio_path = match portfolio {
            Some(portfolio) => {
                let path = document_path(id, "portfolio", &portfolio.extension());
                self.files
                    .put(&path, &portfolio.bytes, &portfolio.content_type())
                    .await?;
                uploaded.push(path.clone());
                Some(path)
            }
            None => None,
        };

        self.applications
            .insert(&NewApplication {
                id,
                applicant,
                resume_path,
                portfolio_path,
            })
            .await
    }

    async fn compensate(&self, id: Uuid, uploaded: &[String]) {
        if uploaded.is_empty() {
            return;
        }
        match self.files.remove(uploaded).await {
            Ok(()) => info!(application_id = %id, removed = ?uploaded, "Rolled back uploaded documents"),
            // The error names the paths that are still stored.
            Err(e) => error!(
                application_id = %id,
                attempted = ?uploaded,
                "Failed to roll back uploaded documents, manual cleanup needed: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MemoryApplicationStore;
    use crate::file::{MemoryObjectStore, UrlSigner};

    struct Fixture {
        service: IntakeService,
        applications: Arc<MemoryApplicationStore>,
        files: Arc<MemoryObjectStore>,
    }

    fn fixture() -> Fixture {
        let applications = Arc::new(MemoryApplicationStore::new());
        let files = Arc::new(MemoryObjectStore::new(
            UrlSigner::new(b"test-signing-secret-test-signing").unwrap(),
        ));
        Fixture {
            service: IntakeService::new(applications.clone(), files.clone()),
            applications,
            files,
        }
    }

    fn applicant() -> ApplicantDetails {
        ApplicantDetails {
            last_name: "Mbala".to_string(),
            middle_name: "Ilunga".to_string(),
            first_name: "Grace".to_string(),
            sex: "F".to_string(),
            birth_date: "2001-04-12".to_string(),
            phone: "+243810000000".to_string(),
            email: "grace@example.org".to_string(),
            institution: "ISTA".to_string(),
            field_of_study: "Architecture".to_string(),
            level: "L3".to_string(),
            ..Default::default()
        }
    }

    fn file(name: &str) -> Option<Attachment> {
        Attachment::from_part(name.to_string(), None, b"content".to_vec())
    }

    #[tokio::test]
    async fn test_submit_resume_only() {
        let f = fixture();

        let id = f.service.submit(applicant(), file("CV.PDF"), None).await.unwrap();

        let record = f.applications.get(id).await.unwrap().unwrap();
        assert_eq!(record.resume_path, format!("{id}/cv.pdf"));
        assert_eq!(record.portfolio_path, None);
        assert_eq!(f.files.paths().await, vec![format!("{id}/cv.pdf")]);
        let stored = f.files.get(&record.resume_path).await.unwrap();
        assert_eq!(stored.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_submit_with_portfolio() {
        let f = fixture();

        let id = f
            .service
            .submit(applicant(), file("resume"), file("book.zip"))
            .await
            .unwrap();

        let record = f.applications.get(id).await.unwrap().unwrap();
        assert_eq!(record.resume_path, format!("{id}/cv.pdf"));
        assert_eq!(record.portfolio_path, Some(format!("{id}/portfolio.zip")));
        assert_eq!(f.files.paths().await.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_resume() {
        let f = fixture();

        let result = f.service.submit(applicant(), None, file("book.zip")).await;

        assert!(matches!(result, Err(SubmissionError::ResumeRequired)));
        assert!(f.applications.is_empty().await);
        assert!(f.files.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_missing_fields() {
        let f = fixture();
        let mut details = applicant();
        details.email = String::new();
        details.level = String::new();

        let result = f.service.submit(details, file("cv.pdf"), None).await;

        match result {
            Err(SubmissionError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["email", "niveau"])
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
        assert!(f.files.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_removes_uploads() {
        let f = fixture();
        f.applications.set_fail_inserts(true);

        let result = f
            .service
            .submit(applicant(), file("cv.pdf"), file("book.pdf"))
            .await;

        assert!(matches!(result, Err(SubmissionError::Backend(_))));
        assert!(f.applications.is_empty().await);
        assert!(f.files.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_stores_nothing() {
        let f = fixture();
        f.files.set_fail_puts(true);

        let result = f.service.submit(applicant(), file("cv.pdf"), None).await;

        assert!(matches!(result, Err(SubmissionError::Backend(IntakeError::Storage(_)))));
        assert!(f.applications.is_empty().await);
    }

    #[tokio::test]
    async fn test_failed_rollback_still_reports_original_error() {
        let f = fixture();
        f.applications.set_fail_inserts(true);
        f.files.set_fail_removals(true);

        let result = f.service.submit(applicant(), file("cv.pdf"), None).await;

        assert!(matches!(result, Err(SubmissionError::Backend(IntakeError::Database(_)))));
        assert!(f.applications.is_empty().await);
        // The orphan stays behind for manual reconciliation.
        assert_eq!(f.files.paths().await.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_rollback_removes_what_it_can() {
        let f = fixture();
        f.applications.set_fail_inserts(true);
        f.files.fail_removals_ending_with("/cv.pdf");

        let result = f
            .service
            .submit(applicant(), file("cv.pdf"), file("book.zip"))
            .await;

        assert!(matches!(result, Err(SubmissionError::Backend(IntakeError::Database(_)))));
        let left = f.files.paths().await;
        assert_eq!(left.len(), 1);
        assert!(left[0].ends_with("/cv.pdf"));
    }

    #[tokio::test]
    async fn test_failed_portfolio_upload_rolls_back_resume() {
        let f = fixture();
        f.files.fail_puts_ending_with("/portfolio.zip");

        let result = f
            .service
            .submit(applicant(), file("cv.pdf"), file("book.zip"))
            .await;

        assert!(matches!(result, Err(SubmissionError::Backend(IntakeError::Storage(_)))));
        assert!(f.applications.is_empty().await);
        assert!(f.files.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_each_submission_gets_its_own_id() {
        let f = fixture();
        let a = f.service.submit(applicant(), file("cv.pdf"), None).await.unwrap();
        let b = f.service.submit(applicant(), file("cv.pdf"), None).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(f.applications.len().await, 2);
    }
}
