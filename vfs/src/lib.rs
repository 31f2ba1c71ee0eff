//! Byte fetching for the lumen glTF loader.
//!
//! Provides a unified API for reading document buffers and images from
//! multiple storage backends through the [`VfsProvider`] trait, the [`Vfs`]
//! router and the URI-aware [`Fetcher`].
//!
//! # Architecture
//!
//! Every operation returns a boxed future (`Pin<Box<dyn Future + Send>>`).
//! The loader awaits them from its single-threaded resolution tasks; tools
//! and tests with blocking providers can use [`poll_now`].
//!
//! ```ignore
//! let mut vfs = Vfs::new();
//! vfs.mount("assets", FileSystemProvider::new("./assets"));
//! let fetcher = Fetcher::new(vfs);
//!
//! // Relative URIs are joined onto the referencing document's directory.
//! let bytes = fetcher.fetch("car.bin", "assets/models").await?;
//! ```
//!
//! # Providers
//!
//! - [`MemoryProvider`]: In-memory storage for tests, embedded assets and `blob:` ids
//! - [`FileSystemProvider`]: Native filesystem access (native only)
//!
//! Custom providers (HTTP, packed archives) implement [`VfsProvider`] and are
//! mounted under the URI scheme they serve, e.g. `vfs.mount("https", http)`.

mod error;
mod fetch;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
mod filesystem;
mod memory;
pub mod path;
mod poll;
mod provider;
pub mod uri;
mod vfs;

pub use error::VfsError;
pub use fetch::Fetcher;
#[cfg(all(feature = "filesystem", not(target_arch = "wasm32")))]
pub use filesystem::FileSystemProvider;
pub use memory::MemoryProvider;
pub use poll::poll_now;
pub use provider::{VfsFuture, VfsProvider};
pub use uri::{DataUri, UriKind};
pub use vfs::Vfs;
