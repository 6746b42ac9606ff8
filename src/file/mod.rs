//! Document storage.
//!
//! The [`ObjectStore`] port with a filesystem implementation, an in-memory
//! fake, and signed download links.

mod memory;
mod signed_url;
mod storage;

pub use memory::MemoryObjectStore;
pub use signed_url::{UrlSigner, DOWNLOAD_PREFIX};
pub use storage::{
    extract_extension, guess_content_type, validate_object_path, FileStorage, ObjectStore,
    StoredObject, FALLBACK_CONTENT_TYPE,
};
