use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::VfsError;
use crate::provider::{VfsFuture, VfsProvider};

/// In-memory provider for tests, embedded assets and `blob:` payloads.
///
/// Cheap to clone; clones share the same storage, so files inserted after
/// mounting are visible through the [`Vfs`](crate::Vfs).
///
/// # Example
///
/// ```ignore
/// let mem = MemoryProvider::new();
/// mem.insert("models/box.gltf", gltf_json);
/// mem.insert("models/box.bin", buffer_bytes);
///
/// let mut vfs = Vfs::new();
/// vfs.mount("assets", mem);
/// ```
#[derive(Clone, Default)]
pub struct MemoryProvider {
    files: Arc<RwLock<HashMap<String, Arc<[u8]>>>>,
}

impl MemoryProvider {
    /// Create an empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at the given path, replacing any previous contents.
    ///
    /// The path should use forward slashes and have no leading slash.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.files.write().insert(path.into(), data.into());
    }

    /// Remove a file at the given path, returning whether it existed.
    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(path).is_some()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether the provider holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl VfsProvider for MemoryProvider {
    fn read(&self, path: &str) -> VfsFuture<Vec<u8>> {
        let found = self.files.read().get(path).cloned();
        let path = path.to_owned();
        Box::pin(async move {
            found
                .map(|data| data.to_vec())
                .ok_or(VfsError::NotFound(path))
        })
    }

    fn exists(&self, path: &str) -> VfsFuture<bool> {
        let found = self.files.read().contains_key(path);
        Box::pin(async move { Ok(found) })
    }
}
