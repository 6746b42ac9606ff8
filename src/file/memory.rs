//! In-memory object store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::signed_url::UrlSigner;
use super::storage::{validate_object_path, ObjectStore, StoredObject};
use crate::{IntakeError, Result};

/// In-memory [`ObjectStore`].
///
/// Failure switches let tests drive upload and cleanup error paths.
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    signer: UrlSigner,
    fail_puts: AtomicBool,
    fail_removals: AtomicBool,
    rejected_puts: std::sync::Mutex<HashSet<String>>,
    rejected_removals: std::sync::Mutex<HashSet<String>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new(signer: UrlSigner) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            signer,
            fail_puts: AtomicBool::new(false),
            fail_removals: AtomicBool::new(false),
            rejected_puts: std::sync::Mutex::new(HashSet::new()),
            rejected_removals: std::sync::Mutex::new(HashSet::new()),
        }
    }

    /// Make every `put` fail.
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make every `remove` fail.
    pub fn set_fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    /// Make `put` fail for every path ending in `suffix`.
    pub fn fail_puts_ending_with(&self, suffix: &str) {
        if let Ok(mut suffixes) = self.rejected_puts.lock() {
            suffixes.insert(suffix.to_string());
        }
    }

    /// Make removal fail for every path ending in `suffix`. Other paths
    /// are still removed.
    pub fn fail_removals_ending_with(&self, suffix: &str) {
        if let Ok(mut suffixes) = self.rejected_removals.lock() {
            suffixes.insert(suffix.to_string());
        }
    }

    fn put_blocked(&self, path: &str) -> bool {
        self.fail_puts.load(Ordering::SeqCst) || ends_with_any(&self.rejected_puts, path)
    }

    fn removal_blocked(&self, path: &str) -> bool {
        self.fail_removals.load(Ordering::SeqCst) || ends_with_any(&self.rejected_removals, path)
    }

    /// Stored paths, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether an object exists.
    pub async fn contains(&self, path: &str) -> bool {
        self.objects.lock().await.contains_key(path)
    }
}

fn ends_with_any(suffixes: &std::sync::Mutex<HashSet<String>>, path: &str) -> bool {
    suffixes
        .lock()
        .map(|suffixes| suffixes.iter().any(|suffix| path.ends_with(suffix.as_str())))
        .unwrap_or(false)
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        validate_object_path(path)?;
        if self.put_blocked(path) {
            return Err(IntakeError::Storage(format!("upload rejected: {path}")));
        }

        let mut objects = self.objects.lock().await;
        if objects.contains_key(path) {
            return Err(IntakeError::Storage(format!("object already exists: {path}")));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<StoredObject> {
        self.objects
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| IntakeError::NotFound(format!("object {path}")))
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        let mut objects = self.objects.lock().await;
        let mut failed = Vec::new();
        for path in paths {
            if self.removal_blocked(path) {
                failed.push(path.as_str());
            } else {
                objects.remove(path);
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(IntakeError::Storage(format!(
                "failed to remove {}: removal rejected",
                failed.join(", ")
            )))
        }
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String> {
        validate_object_path(path)?;
        Ok(self.signer.sign(path, ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryObjectStore {
        MemoryObjectStore::new(UrlSigner::new(b"test-signing-secret-test-signing").unwrap())
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = store();
        store.put("a/cv.pdf", b"cv", "application/pdf").await.unwrap();

        let object = store.get("a/cv.pdf").await.unwrap();
        assert_eq!(object.content_type, "application/pdf");
        assert_eq!(store.paths().await, vec!["a/cv.pdf"]);

        store.remove(&["a/cv.pdf".to_string()]).await.unwrap();
        assert!(!store.contains("a/cv.pdf").await);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let store = store();
        store.set_fail_puts(true);
        assert!(store.put("a/cv.pdf", b"cv", "application/pdf").await.is_err());
        store.set_fail_puts(false);

        store.put("a/cv.pdf", b"cv", "application/pdf").await.unwrap();
        store.set_fail_removals(true);
        assert!(store.remove(&["a/cv.pdf".to_string()]).await.is_err());
        assert!(store.contains("a/cv.pdf").await);
    }

    #[tokio::test]
    async fn test_partial_removal_failure() {
        let store = store();
        store.put("a/cv.pdf", b"cv", "application/pdf").await.unwrap();
        store.put("a/portfolio.zip", b"zip", "application/zip").await.unwrap();
        store.fail_removals_ending_with("cv.pdf");

        let result = store
            .remove(&["a/cv.pdf".to_string(), "a/portfolio.zip".to_string()])
            .await;

        assert!(matches!(result, Err(IntakeError::Storage(msg)) if msg.contains("a/cv.pdf")));
        assert_eq!(store.paths().await, vec!["a/cv.pdf"]);
    }
}
