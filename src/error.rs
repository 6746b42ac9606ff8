//! Error types for the intake service.

use thiserror::Error;

/// Common error type for the intake service.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Database error.
    ///
    /// Errors from sqlx are converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Template error.
    #[error("template error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for IntakeError {
    fn from(e: sqlx::Error) -> Self {
        IntakeError::Database(e.to_string())
    }
}

impl From<crate::template::TemplateError> for IntakeError {
    fn from(e: crate::template::TemplateError) -> Self {
        IntakeError::Template(e.to_string())
    }
}

/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;
