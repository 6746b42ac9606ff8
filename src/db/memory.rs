//! In-memory operator and session stores for tests and local experiments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{NewOperator, NewSession, Operator, OperatorStore, SessionRecord, SessionStore};
use crate::auth::PasswordDigest;
use crate::{IntakeError, Result};

/// In-memory [`OperatorStore`].
#[derive(Default)]
pub struct MemoryOperatorStore {
    operators: Mutex<Vec<Operator>>,
}

impl MemoryOperatorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an operator, leaving any sessions dangling.
    pub async fn remove(&self, id: i64) -> bool {
        let mut operators = self.operators.lock().await;
        let before = operators.len();
        operators.retain(|o| o.id != id);
        operators.len() != before
    }
}

#[async_trait]
impl OperatorStore for MemoryOperatorStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Operator>> {
        let operators = self.operators.lock().await;
        Ok(operators.iter().find(|o| o.email == email).cloned())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Operator>> {
        let operators = self.operators.lock().await;
        Ok(operators.iter().find(|o| o.id == id).cloned())
    }

    async fn create(&self, new_operator: &NewOperator) -> Result<Operator> {
        let mut operators = self.operators.lock().await;
        if operators.iter().any(|o| o.email == new_operator.email) {
            return Err(IntakeError::Database(format!(
                "UNIQUE constraint failed: operators.email ({})",
                new_operator.email
            )));
        }

        let operator = Operator {
            id: operators.iter().map(|o| o.id).max().unwrap_or(0) + 1,
            email: new_operator.email.clone(),
            password_hash: new_operator.digest.hash.clone(),
            password_salt: new_operator.digest.salt.clone(),
            role: new_operator.role.clone(),
            created_at: Utc::now(),
        };
        operators.push(operator.clone());
        Ok(operator)
    }

    async fn update_credentials(&self, id: i64, digest: &PasswordDigest) -> Result<bool> {
        let mut operators = self.operators.lock().await;
        match operators.iter_mut().find(|o| o.id == id) {
            Some(operator) => {
                operator.password_hash = digest.hash.clone();
                operator.password_salt = digest.salt.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory [`SessionStore`].
///
/// `fail_inserts` makes every insert fail, to exercise login error paths.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    fail_inserts: AtomicBool,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle insert failures.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &NewSession) -> Result<SessionRecord> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(IntakeError::Database("session insert rejected".to_string()));
        }

        let record = SessionRecord {
            token: session.token.clone(),
            operator_id: session.operator_id,
            created_at: session.created_at,
            expires_at: session.expires_at,
        };
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&record.token) {
            return Err(IntakeError::Database(
                "UNIQUE constraint failed: admin_sessions.token".to_string(),
            ));
        }
        sessions.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn find(&self, token: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.lock().await.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool> {
        Ok(self.sessions.lock().await.remove(token).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.is_valid_at(now));
        Ok((before - sessions.len()) as u64)
    }
}
