//! Authentication module.
//!
//! Password hashing, admin sessions and operator provisioning.

mod password;
mod provision;
mod session;

pub use password::{
    burn_verification, hash_password, hash_password_with_salt, validate_password,
    verify_password, PasswordDigest, PasswordError, KEY_LENGTH, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH, SALT_LENGTH,
};
pub use provision::{provision_operator, ProvisionError, ProvisionOutcome};
pub use session::{
    generate_token, normalize_email, AuthenticatedOperator, IssuedSession, SessionError,
    SessionManager, DEFAULT_SESSION_TTL_SECS, TOKEN_BYTES,
};
