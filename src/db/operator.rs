//! Operator model and SQLite store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{DbPool, OperatorStore};
use crate::auth::PasswordDigest;
use crate::{IntakeError, Result};

/// Role given to provisioned operators.
pub const ROLE_ADMIN: &str = "admin";

/// A staff member allowed to review applications.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Operator {
    /// Unique operator ID.
    pub id: i64,
    /// Login email, trimmed and lowercased.
    pub email: String,
    /// Hex scrypt output.
    pub password_hash: String,
    /// Hex salt.
    pub password_salt: String,
    /// Role name.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating an operator.
#[derive(Debug, Clone)]
pub struct NewOperator {
    /// Login email, already normalized.
    pub email: String,
    /// Salted password hash.
    pub digest: PasswordDigest,
    /// Role name.
    pub role: String,
}

impl NewOperator {
    /// Create an admin operator.
    pub fn admin(email: impl Into<String>, digest: PasswordDigest) -> Self {
        Self {
            email: email.into(),
            digest,
            role: ROLE_ADMIN.to_string(),
        }
    }
}

/// SQLite-backed [`OperatorStore`].
#[derive(Clone)]
pub struct SqliteOperatorStore {
    pool: DbPool,
}

impl SqliteOperatorStore {
    /// Create a store on the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperatorStore for SqliteOperatorStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT id, email, password_hash, password_salt, role, created_at
             FROM operators WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(operator)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT id, email, password_hash, password_salt, role, created_at
             FROM operators WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(operator)
    }

    async fn create(&self, new_operator: &NewOperator) -> Result<Operator> {
        let result = sqlx::query(
            "INSERT INTO operators (email, password_hash, password_salt, role, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_operator.email)
        .bind(&new_operator.digest.hash)
        .bind(&new_operator.digest.salt)
        .bind(&new_operator.role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| IntakeError::NotFound("operator".to_string()))
    }

    async fn update_credentials(&self, id: i64, digest: &PasswordDigest) -> Result<bool> {
        let result =
            sqlx::query("UPDATE operators SET password_hash = ?, password_salt = ? WHERE id = ?")
                .bind(&digest.hash)
                .bind(&digest.salt)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
