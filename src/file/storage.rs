//! Object storage for uploaded documents.
//!
//! Objects are addressed by relative `/`-separated paths such as
//! `{application_id}/cv.pdf` and map one-to-one onto files below the
//! storage root:
//! ```text
//! {base_path}/
//! └── 3f0c9a52-1d8e-4c1b-9a43-2b7d0e5f6a10/
//!     ├── cv.pdf
//!     └── portfolio.zip
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::signed_url::UrlSigner;
use crate::{IntakeError, Result};

/// Content type used when neither the upload nor the file name tells.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A stored object read back from storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// MIME type.
    pub content_type: String,
}

/// Object storage port.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object. Fails if the path is already taken. A failed write
    /// leaves nothing behind.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Read an object. Missing objects are `NotFound`.
    async fn get(&self, path: &str) -> Result<StoredObject>;

    /// Remove objects. Paths that do not exist are skipped. Every path is
    /// attempted; if any removal fails the error names the paths left behind.
    async fn remove(&self, paths: &[String]) -> Result<()>;

    /// A download link valid for `ttl`.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String>;
}

/// Reject paths that could escape the storage root.
pub fn validate_object_path(path: &str) -> Result<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(IntakeError::Validation(format!("invalid object path: {path}")));
    }
    Ok(())
}

/// Extract the lowercase extension from a file name.
///
/// ```
/// use intake::file::extract_extension;
///
/// assert_eq!(extract_extension("Resume.PDF").as_deref(), Some("pdf"));
/// assert_eq!(extract_extension("archive.tar.gz").as_deref(), Some("gz"));
/// assert_eq!(extract_extension("README"), None);
/// ```
pub fn extract_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Guess a MIME type from an object path.
pub fn guess_content_type(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

/// Write a freshly created object, deleting it again if the write fails.
async fn write_or_discard<W>(writer: &mut W, bytes: &[u8], file_path: &Path) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if let Err(e) = written {
        match tokio::fs::remove_file(file_path).await {
            Ok(()) => {}
            Err(cleanup) if cleanup.kind() == io::ErrorKind::NotFound => {}
            Err(cleanup) => warn!(
                path = %file_path.display(),
                "Failed to discard partial object: {}",
                cleanup
            ),
        }
        return Err(e.into());
    }
    Ok(())
}

/// Filesystem-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
    signer: UrlSigner,
}

impl FileStorage {
    /// Create a storage rooted at `base_path`, creating the directory.
    pub fn new(base_path: impl Into<PathBuf>, signer: UrlSigner) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path, signer })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Full filesystem path of an object.
    pub fn file_path(&self, path: &str) -> Result<PathBuf> {
        validate_object_path(path)?;
        Ok(path
            .split('/')
            .fold(self.base_path.clone(), |acc, segment| acc.join(segment)))
    }
}

#[async_trait]
impl ObjectStore for FileStorage {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let file_path = self.file_path(path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(IntakeError::Storage(format!("object already exists: {path}")));
            }
            Err(e) => return Err(e.into()),
        };
        write_or_discard(&mut file, bytes, &file_path).await?;

        debug!(path, content_type, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<StoredObject> {
        let file_path = self.file_path(path)?;
        match tokio::fs::read(&file_path).await {
            Ok(bytes) => Ok(StoredObject {
                bytes,
                content_type: guess_content_type(path),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(IntakeError::NotFound(format!("object {path}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        let mut failed = Vec::new();
        let mut first_error = None;

        for path in paths {
            let file_path = match self.file_path(path) {
                Ok(file_path) => file_path,
                Err(e) => {
                    failed.push(path.as_str());
                    first_error.get_or_insert(e.to_string());
                    continue;
                }
            };
            match tokio::fs::remove_file(&file_path).await {
                Ok(()) => debug!(path = %path, "Removed object"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path, "Failed to remove object: {}", e);
                    failed.push(path.as_str());
                    first_error.get_or_insert(e.to_string());
                    continue;
                }
            }

            // Drop the per-application directory once it is empty.
            if let Some(parent) = file_path.parent() {
                if parent != self.base_path {
                    let _ = tokio::fs::remove_dir(parent).await;
                }
            }
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(IntakeError::Storage(format!(
                "failed to remove {}: {e}",
                failed.join(", ")
            ))),
        }
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
        validate_object_path(path)?;
        Ok(self.signer.sign(path, ttl))
    }
}
