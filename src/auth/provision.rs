//! Operator provisioning.
//!
//! Creates the admin operator, or rotates its credentials when the email
//! is already registered.

use thiserror::Error;
use tracing::info;

use super::password::{hash_password, validate_password, PasswordError};
use super::session::normalize_email;
use crate::db::{NewOperator, OperatorStore};

/// Provisioning errors.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Email was empty or not an address.
    #[error("invalid email address")]
    InvalidEmail,

    /// Password rejected or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Store failure.
    #[error("database error: {0}")]
    Database(String),
}

/// What provisioning did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new operator was created.
    Created(i64),
    /// An existing operator got a fresh salt and hash.
    Rotated(i64),
}

/// Create or rotate an admin operator.
pub async fn provision_operator(
    store: &dyn OperatorStore,
    email: &str,
    password: &str,
) -> Result<ProvisionOutcome, ProvisionError> {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        return Err(ProvisionError::InvalidEmail);
    }
    validate_password(password)?;

    let digest = hash_password(password)?;

    let existing = store
        .find_by_email(&email)
        .await
        .map_err(|e| ProvisionError::Database(e.to_string()))?;

    match existing {
        Some(operator) => {
            store
                .update_credentials(operator.id, &digest)
                .await
                .map_err(|e| ProvisionError::Database(e.to_string()))?;
            info!(operator_id = operator.id, "Operator credentials rotated");
            Ok(ProvisionOutcome::Rotated(operator.id))
        }
        None => {
            let operator = store
                .create(&NewOperator::admin(email, digest))
                .await
                .map_err(|e| ProvisionError::Database(e.to_string()))?;
            info!(operator_id = operator.id, "Operator created");
            Ok(ProvisionOutcome::Created(operator.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::MemoryOperatorStore;

    #[tokio::test]
    async fn test_provision_creates_operator() {
        let store = MemoryOperatorStore::new();

        let outcome = provision_operator(&store, "Admin@Example.org", "first-password")
            .await
            .unwrap();
        let ProvisionOutcome::Created(id) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };

        let op = store.find_by_email("admin@example.org").await.unwrap().unwrap();
        assert_eq!(op.id, id);
        assert_eq!(op.role, "admin");
        assert!(verify_password("first-password", &op.password_salt, &op.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_provision_rotates_credentials() {
        let store = MemoryOperatorStore::new();
        provision_operator(&store, "admin@example.org", "first-password")
            .await
            .unwrap();
        let before = store.find_by_email("admin@example.org").await.unwrap().unwrap();

        let outcome = provision_operator(&store, "admin@example.org", "second-password")
            .await
            .unwrap();
        assert_eq!(outcome, ProvisionOutcome::Rotated(before.id));

        let after = store.find_by_email("admin@example.org").await.unwrap().unwrap();
        assert_ne!(after.password_salt, before.password_salt);
        assert!(!verify_password("first-password", &after.password_salt, &after.password_hash).unwrap());
        assert!(verify_password("second-password", &after.password_salt, &after.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_provision_rejects_bad_input() {
        let store = MemoryOperatorStore::new();

        assert!(matches!(
            provision_operator(&store, "   ", "long-enough-password").await,
            Err(ProvisionError::InvalidEmail)
        ));
        assert!(matches!(
            provision_operator(&store, "admin@example.org", "short").await,
            Err(ProvisionError::Password(PasswordError::TooShort))
        ));
        assert!(store.find_by_email("admin@example.org").await.unwrap().is_none());
    }
}
