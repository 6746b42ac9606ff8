//! Password hashing and verification.
//!
//! Uses scrypt (N = 2^14, r = 8, p = 1, 64-byte output) with a random
//! 16-byte salt. Salt and derived key are stored as separate hex strings.

use rand_core::{OsRng, RngCore};
use scrypt::{scrypt, Params};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes.
pub const KEY_LENGTH: usize = 64;

const LOG_N: u8 = 14;
const R: u32 = 8;
const P: u32 = 1;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Key derivation failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored salt or hash is not valid hex.
    #[error("malformed stored password digest")]
    MalformedDigest,
}

/// A salted password hash, both parts hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded scrypt output.
    pub hash: String,
}

fn derive(password: &str, salt: &[u8]) -> Result<[u8; KEY_LENGTH], PasswordError> {
    let params =
        Params::new(LOG_N, R, P, KEY_LENGTH).map_err(|e| PasswordError::HashError(e.to_string()))?;
    let mut out = [0u8; KEY_LENGTH];
    scrypt(password.as_bytes(), salt, &params, &mut out)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(out)
}

/// Hash a password with a freshly generated salt.
///
/// # Examples
///
/// ```
/// use intake::auth::{hash_password, verify_password};
///
/// let digest = hash_password("correct horse").unwrap();
/// assert_eq!(digest.salt.len(), 32);
/// assert_eq!(digest.hash.len(), 128);
/// assert!(verify_password("correct horse", &digest.salt, &digest.hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<PasswordDigest, PasswordError> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    hash_password_with_salt(password, &salt)
}

/// Hash a password with the given salt.
pub fn hash_password_with_salt(
    password: &str,
    salt: &[u8],
) -> Result<PasswordDigest, PasswordError> {
    let key = derive(password, salt)?;
    Ok(PasswordDigest {
        salt: hex::encode(salt),
        hash: hex::encode(key),
    })
}

/// Verify a password against a stored salt and hash.
///
/// Returns `Ok(false)` on mismatch, including a stored hash of the wrong
/// length. Malformed hex is reported as [`PasswordError::MalformedDigest`].
pub fn verify_password(password: &str, salt: &str, hash: &str) -> Result<bool, PasswordError> {
    let salt = hex::decode(salt).map_err(|_| PasswordError::MalformedDigest)?;
    let expected = hex::decode(hash).map_err(|_| PasswordError::MalformedDigest)?;

    let actual = derive(password, &salt)?;
    if expected.len() != actual.len() {
        return Ok(false);
    }
    Ok(bool::from(actual.ct_eq(expected.as_slice())))
}

/// Run one key derivation and discard the result.
///
/// Lets a failed lookup cost the same as a failed comparison.
pub fn burn_verification(password: &str) {
    let _ = derive(password, &[0u8; SALT_LENGTH]);
}

/// Validate password requirements for provisioning.
///
/// ```
/// use intake::auth::validate_password;
///
/// assert!(validate_password("short").is_err());
/// assert!(validate_password("valid_password_123").is_ok());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}
