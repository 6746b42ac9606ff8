//! Storage ports.
//!
//! Handlers and services only see these traits, held as `Arc<dyn _>`.
//! The SQLite adapters back the running service; the in-memory ones back
//! tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{NewOperator, NewSession, Operator, SessionRecord};
use crate::application::{Application, NewApplication, ReviewUpdate};
use crate::auth::PasswordDigest;
use crate::Result;

/// Operator credential storage.
#[async_trait]
pub trait OperatorStore: Send + Sync {
    /// Find an operator by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Operator>>;

    /// Get an operator by ID.
    async fn get_by_id(&self, id: i64) -> Result<Option<Operator>>;

    /// Create an operator. Fails if the email is taken.
    async fn create(&self, new_operator: &NewOperator) -> Result<Operator>;

    /// Replace an operator's salt and hash. Returns false if no such operator.
    async fn update_credentials(&self, id: i64, digest: &PasswordDigest) -> Result<bool>;
}

/// Admin session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session.
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord>;

    /// Look up a session by exact token match, expired or not.
    async fn find(&self, token: &str) -> Result<Option<SessionRecord>>;

    /// Delete a session. Returns whether a row was removed.
    async fn delete(&self, token: &str) -> Result<bool>;

    /// Delete every session whose expiry is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Application record storage.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new record with status `received`.
    async fn insert(&self, new_application: &NewApplication) -> Result<Application>;

    /// Get a record by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Application>>;

    /// List all records, newest first.
    async fn list_recent(&self) -> Result<Vec<Application>>;

    /// Apply a review update. Returns false if no such record.
    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<bool>;
}
