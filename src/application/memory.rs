//! In-memory application store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::types::{Application, ApplicationStatus, NewApplication, ReviewUpdate};
use crate::db::ApplicationStore;
use crate::{IntakeError, Result};

/// In-memory [`ApplicationStore`].
///
/// `set_fail_inserts` makes inserts fail, to exercise upload rollback;
/// `set_fail_reads` does the same for listing.
#[derive(Default)]
pub struct MemoryApplicationStore {
    applications: Mutex<Vec<Application>>,
    fail_inserts: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryApplicationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle insert failures.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Toggle listing failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.applications.lock().await.len()
    }

    /// Whether no record is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, new_application: &NewApplication) -> Result<Application> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(IntakeError::Database("application insert rejected".to_string()));
        }

        let mut applications = self.applications.lock().await;
        if applications.iter().any(|a| a.id == new_application.id) {
            return Err(IntakeError::Database(
                "UNIQUE constraint failed: applications.id".to_string(),
            ));
        }

        let application = Application {
            id: new_application.id,
            created_at: Utc::now(),
            applicant: new_application.applicant.clone(),
            resume_path: new_application.resume_path.clone(),
            portfolio_path: new_application.portfolio_path.clone(),
            status: ApplicationStatus::Received,
            notes: None,
        };
        applications.push(application.clone());
        Ok(application)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let applications = self.applications.lock().await;
        Ok(applications.iter().find(|a| a.id == id).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Application>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(IntakeError::Database("application listing rejected".to_string()));
        }
        let applications = self.applications.lock().await;
        // Reverse first so equal timestamps keep newest-inserted first.
        let mut list: Vec<Application> = applications.iter().rev().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<bool> {
        let mut applications = self.applications.lock().await;
        match applications.iter_mut().find(|a| a.id == id) {
            Some(application) => {
                application.status = update.status;
                application.notes = update.notes.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
