//! Time-limited signed download links.
//!
//! A link carries its expiry and an HMAC-SHA256 over `"{path}\n{expires}"`:
//! `/files/{path}?expires={unix}&signature={hex}`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{IntakeError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Route prefix served by the download handler.
pub const DOWNLOAD_PREFIX: &str = "/files/";

/// Signs and verifies download links.
#[derive(Clone)]
pub struct UrlSigner {
    mac: HmacSha256,
}

impl UrlSigner {
    /// Create a signer keyed by `secret`.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.is_empty() {
            return Err(IntakeError::Config("signing secret is empty".to_string()));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| IntakeError::Config(format!("invalid signing secret: {e}")))?;
        Ok(Self { mac })
    }

    fn mac_for(&self, path: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        mac
    }

    /// Signature for `path` valid until `expires` (unix seconds).
    pub fn signature(&self, path: &str, expires: i64) -> String {
        hex::encode(self.mac_for(path, expires).finalize().into_bytes())
    }

    /// Build a link valid for `ttl` from now.
    pub fn sign(&self, path: &str, ttl: Duration) -> String {
        self.sign_at(path, ttl, Utc::now())
    }

    /// Build a link valid for `ttl` from `now`.
    pub fn sign_at(&self, path: &str, ttl: Duration, now: DateTime<Utc>) -> String {
        let expires = now.timestamp() + ttl.as_secs() as i64;
        format!(
            "{DOWNLOAD_PREFIX}{}?expires={expires}&signature={}",
            encode_path(path),
            self.signature(path, expires)
        )
    }

    /// Check a link's parameters as of now.
    pub fn verify(&self, path: &str, expires: i64, signature: &str) -> bool {
        self.verify_at(path, expires, signature, Utc::now())
    }

    /// Check a link's parameters as of `now`. The comparison is constant time.
    pub fn verify_at(&self, path: &str, expires: i64, signature: &str, now: DateTime<Utc>) -> bool {
        if expires <= now.timestamp() {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.mac_for(path, expires).verify_slice(&signature).is_ok()
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

/// Percent-encode each segment of an object path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
