//! Operator review of submitted applications.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use super::types::{Application, ApplicationStatus, ReviewUpdate};
use crate::db::ApplicationStore;
use crate::file::ObjectStore;
use crate::{IntakeError, Result};

/// An application with freshly signed document links.
#[derive(Debug, Clone)]
pub struct ReviewEntry {
    /// The record.
    pub application: Application,
    /// Résumé download link, if one could be produced.
    pub resume_url: Option<String>,
    /// Portfolio download link, if any.
    pub portfolio_url: Option<String>,
}

/// Lists and edits applications on behalf of an authenticated operator.
#[derive(Clone)]
pub struct ReviewService {
    applications: Arc<dyn ApplicationStore>,
    files: Arc<dyn ObjectStore>,
    link_ttl: Duration,
}

impl ReviewService {
    /// Create a service. `link_ttl` bounds the lifetime of download links.
    pub fn new(
        applications: Arc<dyn ApplicationStore>,
        files: Arc<dyn ObjectStore>,
        link_ttl: Duration,
    ) -> Self {
        Self {
            applications,
            files,
            link_ttl,
        }
    }

    async fn link(&self, path: &str) -> Option<String> {
        match self.files.signed_url(path, self.link_ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(path, "Could not sign download link: {}", e);
                None
            }
        }
    }

    async fn entry(&self, application: Application) -> ReviewEntry {
        let resume_url = self.link(&application.resume_path).await;
        let portfolio_url = match application.portfolio_path.as_deref() {
            Some(path) => self.link(path).await,
            None => None,
        };
        ReviewEntry {
            application,
            resume_url,
            portfolio_url,
        }
    }

    /// All applications, newest first.
    pub async fn list(&self) -> Result<Vec<ReviewEntry>> {
        let applications = self.applications.list_recent().await?;
        let mut entries = Vec::with_capacity(applications.len());
        for application in applications {
            entries.push(self.entry(application).await);
        }
        Ok(entries)
    }

    /// One application.
    pub async fn get(&self, id: Uuid) -> Result<ReviewEntry> {
        let application = self
            .applications
            .get(id)
            .await?
            .ok_or_else(|| IntakeError::NotFound("application".to_string()))?;
        Ok(self.entry(application).await)
    }

    /// Set status and notes. Blank notes clear them. Last write wins.
    pub async fn update(&self, id: Uuid, status: &str, notes: Option<&str>) -> Result<()> {
        let status: ApplicationStatus = status.parse().map_err(IntakeError::Validation)?;
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let update = ReviewUpdate { status, notes };
        if !self.applications.update_review(id, &update).await? {
            return Err(IntakeError::NotFound("application".to_string()));
        }

        info!(application_id = %id, status = %status, "Application reviewed");
        Ok(())
    }
}
