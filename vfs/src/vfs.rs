use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::VfsError;
use crate::path;
use crate::provider::{VfsFuture, VfsProvider};

/// Routes normalized paths to mounted providers.
///
/// The first segment of `"source/rest/of/path"` names the provider, which
/// receives `rest/of/path`. A path whose first segment names no mount goes,
/// whole, to the default source when one is set.
///
/// Clones share the mounted providers.
///
/// ```ignore
/// let mut vfs = Vfs::new();
/// vfs.mount("assets", FileSystemProvider::new("./assets"));
/// vfs.set_default("assets");
///
/// // both read ./assets/models/car.glb
/// vfs.read("assets/models/car.glb").await?;
/// vfs.read("models/car.glb").await?;
/// ```
#[derive(Clone, Default)]
pub struct Vfs {
    sources: HashMap<String, Arc<dyn VfsProvider>>,
    default_source: Option<String>,
}

impl fmt::Debug for Vfs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.sources.keys().collect();
        names.sort();
        f.debug_struct("Vfs")
            .field("sources", &names)
            .field("default_source", &self.default_source)
            .finish()
    }
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `provider` as `name`, replacing an earlier mount of that name.
    /// Clones taken before this call do not see the new mount.
    pub fn mount(&mut self, name: impl Into<String>, provider: impl VfsProvider) {
        let name = name.into();
        if self.sources.insert(name.clone(), Arc::new(provider)).is_some() {
            log::debug!("VFS source \"{name}\" replaced");
        }
    }

    /// Source that receives paths naming no mount.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_source = Some(name.into());
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Read a whole file.
    pub fn read(&self, raw_path: &str) -> VfsFuture<Vec<u8>> {
        match self.route(raw_path) {
            Ok((provider, inner)) => provider.read(&inner),
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }

    pub fn exists(&self, raw_path: &str) -> VfsFuture<bool> {
        match self.route(raw_path) {
            Ok((provider, inner)) => provider.exists(&inner),
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }

    fn route(&self, raw_path: &str) -> Result<(&dyn VfsProvider, String), VfsError> {
        let normalized = path::normalize(raw_path)?;
        let (source, rest) = path::split_source(&normalized);
        if let Some(provider) = self.sources.get(source) {
            return Ok((provider.as_ref(), rest.to_owned()));
        }
        match self
            .default_source
            .as_deref()
            .and_then(|name| self.sources.get(name))
        {
            Some(provider) => Ok((provider.as_ref(), normalized)),
            None => Err(VfsError::NoSuchSource(source.to_owned())),
        }
    }
}
