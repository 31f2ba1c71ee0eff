//! Loader configuration, usually read from a `lumen.toml`.
//!
//! ```toml
//! [loader]
//! image_based_lighting = true
//! manual_srgb = false
//! texture_lod = false
//! strict_extensions = false
//!
//! [[mount]]
//! name = "assets"
//! path = "./assets"
//! default = true
//! ```

use std::path::Path;

use serde::Deserialize;

use lumen_vfs::{FileSystemProvider, Vfs, VfsError};

use super::error::GltfError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub loader: LoaderConfig,
    pub mount: Vec<MountConfig>,
}

/// Engine toggles folded into every mesh program, plus load policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Enable image-based lighting in mesh programs.
    pub image_based_lighting: bool,
    /// Shaders convert sRGB textures manually.
    pub manual_srgb: bool,
    /// Shaders sample textures with explicit LOD.
    pub texture_lod: bool,
    /// Fail the load when `extensionsRequired` lists anything.
    pub strict_extensions: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            image_based_lighting: true,
            manual_srgb: false,
            texture_lod: false,
            strict_extensions: false,
        }
    }
}

/// A filesystem directory mounted into the VFS.
#[derive(Debug, Clone, Deserialize)]
pub struct MountConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub default: bool,
}

impl ConfigFile {
    pub fn from_toml_str(content: &str) -> Result<Self, GltfError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a config file from disk.
    pub fn load(path: &Path) -> Result<Self, GltfError> {
        let content = std::fs::read_to_string(path).map_err(VfsError::from)?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded {} ({} mounts)",
            path.display(),
            config.mount.len()
        );
        Ok(config)
    }

    /// Mount every configured directory into a fresh [`Vfs`].
    pub fn build_vfs(&self) -> Vfs {
        let mut vfs = Vfs::new();
        for mount in &self.mount {
            log::info!("VFS mount: \"{}\" -> {:?}", mount.name, mount.path);
            vfs.mount(&mount.name, FileSystemProvider::new(&mount.path));
        }
        let mut defaults = self.mount.iter().filter(|m| m.default);
        if let Some(first) = defaults.next() {
            if defaults.next().is_some() {
                log::warn!("Several default mounts, using \"{}\"", first.name);
            }
            vfs.set_default(&first.name);
        }
        vfs
    }
}
