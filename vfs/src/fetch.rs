use crate::error::VfsError;
use crate::memory::MemoryProvider;
use crate::path;
use crate::provider::{VfsFuture, VfsProvider};
use crate::uri::{self, UriKind};
use crate::vfs::Vfs;

/// Turns document URIs into bytes.
///
/// Routing by URI kind:
///
/// - `data:`: decoded inline, no I/O
/// - `blob:<id>`: looked up in the blob registry (see [`register_blob`](Self::register_blob))
/// - `scheme://rest`: read from the provider mounted under `scheme` as `rest`
/// - `/path`: read from the VFS root
/// - anything else: percent-decoded and joined onto the base path
///
/// `Clone` is cheap; clones share the same VFS and blob registry.
#[derive(Clone, Default)]
pub struct Fetcher {
    vfs: Vfs,
    blobs: MemoryProvider,
}

impl Fetcher {
    /// Create a fetcher reading through the given VFS.
    pub fn new(vfs: Vfs) -> Self {
        Self {
            vfs,
            blobs: MemoryProvider::new(),
        }
    }

    /// The VFS this fetcher reads through.
    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// Register bytes under a `blob:` object id.
    pub fn register_blob(&self, id: impl Into<String>, data: Vec<u8>) {
        self.blobs.insert(id, data);
    }

    /// Fetch the bytes a URI refers to.
    ///
    /// `base` is the directory of the referencing document; it only matters
    /// for relative URIs.
    pub fn fetch(&self, uri: &str, base: &str) -> VfsFuture<Vec<u8>> {
        match UriKind::classify(uri) {
            UriKind::Data => {
                let decoded = uri::decode_data_uri(uri).map(|d| d.data);
                Box::pin(async move { decoded })
            }
            UriKind::Blob(id) => self.blobs.read(id),
            UriKind::Absolute { scheme, rest } => {
                if self.vfs.has_source(scheme) {
                    self.vfs.read(&format!("{scheme}/{rest}"))
                } else {
                    let err = VfsError::NoSuchSource(scheme.to_owned());
                    Box::pin(async move { Err(err) })
                }
            }
            UriKind::Rooted(rooted) => match path::percent_decode(rooted) {
                Ok(decoded) => self.vfs.read(&decoded),
                Err(e) => Box::pin(async move { Err(e) }),
            },
            UriKind::Relative(relative) => {
                let joined =
                    path::percent_decode(relative).and_then(|decoded| path::join(base, &decoded));
                match joined {
                    Ok(full) => {
                        log::trace!("Fetching {uri} as {full}");
                        self.vfs.read(&full)
                    }
                    Err(e) => Box::pin(async move { Err(e) }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll_now;

    fn fetcher_with(files: &[(&str, &[u8])]) -> Fetcher {
        let mem = MemoryProvider::new();
        for (path, data) in files {
            mem.insert(*path, data.to_vec());
        }
        let mut vfs = Vfs::new();
        vfs.mount("assets", mem);
        Fetcher::new(vfs)
    }

    #[test]
    fn relative_uri_uses_base() {
        let fetcher = fetcher_with(&[("models/car.bin", b"car")]);
        assert_eq!(
            poll_now(fetcher.fetch("car.bin", "assets/models")).unwrap(),
            b"car"
        );
    }

    #[test]
    fn relative_uri_is_percent_decoded() {
        let fetcher = fetcher_with(&[("models/my car.bin", b"car")]);
        assert_eq!(
            poll_now(fetcher.fetch("my%20car.bin", "assets/models")).unwrap(),
            b"car"
        );
    }

    #[test]
    fn absolute_uri_routes_by_scheme() {
        let fetcher = fetcher_with(&[("cdn/car.bin", b"remote")]);
        assert_eq!(
            poll_now(fetcher.fetch("assets://cdn/car.bin", "ignored")).unwrap(),
            b"remote"
        );
        assert!(matches!(
            poll_now(fetcher.fetch("https://cdn/car.bin", "")),
            Err(VfsError::NoSuchSource(s)) if s == "https"
        ));
    }

    #[test]
    fn rooted_uri_ignores_base() {
        let fetcher = fetcher_with(&[("shared/a.bin", b"a")]);
        assert_eq!(
            poll_now(fetcher.fetch("/assets/shared/a.bin", "other/dir")).unwrap(),
            b"a"
        );
    }

    #[test]
    fn data_and_blob_uris() {
        let fetcher = Fetcher::default();
        assert_eq!(
            poll_now(fetcher.fetch("data:application/octet-stream;base64,AQID", "")).unwrap(),
            vec![1, 2, 3]
        );

        fetcher.register_blob("42", vec![9, 9]);
        assert_eq!(poll_now(fetcher.fetch("blob:42", "")).unwrap(), vec![9, 9]);
        assert!(poll_now(fetcher.fetch("blob:43", "")).is_err());
    }

    #[test]
    fn missing_file_is_transport_error() {
        let fetcher = fetcher_with(&[]);
        assert!(matches!(
            poll_now(fetcher.fetch("gone.bin", "assets")),
            Err(VfsError::NotFound(_))
        ));
    }
}
