//! Admin session rows and SQLite store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{DbPool, SessionStore};
use crate::{IntakeError, Result};

/// A persisted admin session.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRecord {
    /// Opaque hex token, also the primary key.
    pub token: String,
    /// Owning operator.
    pub operator_id: i64,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Data for creating a session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Opaque hex token.
    pub token: String,
    /// Owning operator.
    pub operator_id: i64,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// SQLite-backed [`SessionStore`].
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: DbPool,
}

impl SqliteSessionStore {
    /// Create a store on the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord> {
        sqlx::query(
            "INSERT INTO admin_sessions (token, operator_id, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(session.operator_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        self.find(&session.token)
            .await?
            .ok_or_else(|| IntakeError::NotFound("session".to_string()))
    }

    async fn find(&self, token: &str) -> Result<Option<SessionRecord>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT token, operator_id, created_at, expires_at
             FROM admin_sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        // Timestamps are stored as UTC RFC 3339 text, which sorts chronologically.
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
