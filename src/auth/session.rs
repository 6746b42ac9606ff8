//! Admin session issuance, resolution and revocation.
//!
//! A session is an opaque random token stored with its operator and an
//! absolute expiry. Resolution is lazy: an expired row is simply treated
//! as absent.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::password::{burn_verification, verify_password};
use crate::db::{NewSession, OperatorStore, SessionStore};

/// Token entropy in bytes (hex doubles the length).
pub const TOKEN_BYTES: usize = 32;

/// Default session lifetime (8 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// Session-related errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Unknown email or wrong password. Deliberately not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backing store failed.
    #[error("session storage error: {0}")]
    Storage(String),
}

/// A freshly issued session, handed to the caller to set as a cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Opaque hex token.
    pub token: String,
    /// Owning operator.
    pub operator_id: i64,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

/// The operator behind a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedOperator {
    /// Operator ID.
    pub id: i64,
    /// Operator email.
    pub email: String,
    /// Operator role.
    pub role: String,
    /// Session token that authenticated the request.
    pub token: String,
}

/// Generate a session token: 32 random bytes, lowercase hex.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Normalize a login email: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues, resolves and revokes admin sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    operators: Arc<dyn OperatorStore>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a manager with the given stores and session lifetime.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        operators: Arc<dyn OperatorStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            operators,
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check credentials and issue a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, SessionError> {
        let email = normalize_email(email);

        let operator = self
            .operators
            .find_by_email(&email)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        let password = password.to_string();
        let Some(operator) = operator else {
            tokio::task::spawn_blocking(move || burn_verification(&password))
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
            debug!("Login rejected: unknown operator");
            return Err(SessionError::InvalidCredentials);
        };

        let salt = operator.password_salt.clone();
        let hash = operator.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &salt, &hash))
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        match verified {
            Ok(true) => {}
            Ok(false) => {
                debug!(operator_id = operator.id, "Login rejected: wrong password");
                return Err(SessionError::InvalidCredentials);
            }
            Err(e) => {
                warn!(operator_id = operator.id, "Stored password digest is unusable: {}", e);
                return Err(SessionError::InvalidCredentials);
            }
        }

        let issued = self.issue(operator.id).await?;
        info!(operator_id = operator.id, "Operator logged in");
        Ok(issued)
    }

    /// Issue a session for an operator, starting now.
    pub async fn issue(&self, operator_id: i64) -> Result<IssuedSession, SessionError> {
        self.issue_at(operator_id, Utc::now()).await
    }

    /// Issue a session for an operator, starting at `now`.
    pub async fn issue_at(
        &self,
        operator_id: i64,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, SessionError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let new_session = NewSession {
            token: generate_token(),
            operator_id,
            created_at: now,
            expires_at: now + ttl,
        };

        let record = self
            .sessions
            .insert(&new_session)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        Ok(IssuedSession {
            token: record.token,
            operator_id: record.operator_id,
            expires_at: record.expires_at,
        })
    }

    /// Resolve a token to its operator, as of now.
    pub async fn resolve(&self, token: &str) -> Option<AuthenticatedOperator> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve a token to its operator, as of `now`.
    ///
    /// Not found, expired, missing operator and store failures all yield `None`.
    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<AuthenticatedOperator> {
        if token.is_empty() {
            return None;
        }

        let record = match self.sessions.find(token).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                return None;
            }
        };

        if !record.is_valid_at(now) {
            return None;
        }

        match self.operators.get_by_id(record.operator_id).await {
            Ok(Some(operator)) => Some(AuthenticatedOperator {
                id: operator.id,
                email: operator.email,
                role: operator.role,
                token: record.token,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Operator lookup failed: {}", e);
                None
            }
        }
    }

    /// Delete a session. Returns whether one existed.
    pub async fn revoke(&self, token: &str) -> Result<bool, SessionError> {
        let removed = self
            .sessions
            .delete(token)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        if removed {
            info!("Session revoked");
        }
        Ok(removed)
    }

    /// Delete expired sessions. Returns how many were removed.
    pub async fn prune_expired(&self) -> Result<u64, SessionError> {
        self.sessions
            .delete_expired(Utc::now())
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }
}
