use std::path::PathBuf;

use crate::provider::{VfsFuture, VfsProvider};

/// File system provider that fetches buffers and images from disk.
///
/// The root path is joined with the VFS path to form the actual filesystem
/// path. Reads are blocking (`std::fs`) inside the returned futures, which
/// matches the "fetch succeeds or fails" contract of the loader.
///
/// Path traversal is prevented by the VFS path normalization which rejects
/// `..` segments that would escape the root before they reach the provider.
pub struct FileSystemProvider {
    root: PathBuf,
}

impl FileSystemProvider {
    /// Create a provider rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl VfsProvider for FileSystemProvider {
    fn read(&self, path: &str) -> VfsFuture<Vec<u8>> {
        let full_path = self.resolve(path);
        Box::pin(async move {
            log::debug!("Reading {}", full_path.display());
            Ok(std::fs::read(full_path)?)
        })
    }

    fn exists(&self, path: &str) -> VfsFuture<bool> {
        let full_path = self.resolve(path);
        Box::pin(async move { Ok(full_path.is_file()) })
    }
}
