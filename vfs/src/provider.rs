use std::future::Future;
use std::pin::Pin;

use crate::VfsError;

/// A boxed, `Send` future returning a `Result`.
///
/// All [`VfsProvider`] methods return this type, so fetches can be awaited
/// from any executor (the glTF resolver awaits them on a `LocalSet`).
pub type VfsFuture<T> = Pin<Box<dyn Future<Output = Result<T, VfsError>> + Send>>;

/// Trait for byte-fetching backends.
///
/// A provider turns a path into raw bytes or fails with a transport error.
/// Nothing else is promised: no retries, no partial reads.
///
/// # Path Contract
///
/// Paths passed to provider methods are already normalized by the [`Vfs`](crate::Vfs)
/// router: forward slashes, no leading/trailing slashes, no `..` or `.` segments.
/// The path is relative to the provider's root (the source prefix has been stripped).
pub trait VfsProvider: Send + Sync + 'static {
    /// Read the entire contents of a file at the given path.
    fn read(&self, path: &str) -> VfsFuture<Vec<u8>>;

    /// Check whether a file exists at the given path.
    fn exists(&self, path: &str) -> VfsFuture<bool>;
}
