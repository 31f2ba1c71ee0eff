//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use lumen_core::gltf::{ConfigFile, GltfError, GltfLoader, MountConfig};
use lumen_vfs::Fetcher;

/// Inspector arguments.
#[derive(Parser, Debug)]
#[command(
    name = "lumen-inspect",
    about = "Load a glTF document and print what it resolves to",
    long_about = "Load a glTF 2.0 document (.gltf or .glb) through the lumen VFS and print \
                  its scene hierarchy, cameras, animations and diagnostics.\n\n\
                  Without --config or --mount the current directory is mounted as the \
                  default source."
)]
pub struct InspectArgs {
    /// Document URI, e.g. `models/fox.glb` or `assets://fox.gltf`.
    pub uri: String,

    /// Loader configuration file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mount a directory as `NAME=PATH`. Repeatable; the first one becomes the
    /// default source unless the config file names one.
    #[arg(long = "mount", value_name = "NAME=PATH", value_parser = parse_mount)]
    pub mounts: Vec<MountConfig>,

    /// Resolve every entity of a type instead of the scene. Accepts singular
    /// or plural names (`mesh`, `accessors`, ...). Repeatable.
    #[arg(long = "dump", value_name = "TYPE")]
    pub dump: Vec<String>,

    /// Fail when the document requires any extension.
    #[arg(long)]
    pub strict: bool,

    /// Disable image-based lighting in mesh programs.
    #[arg(long)]
    pub no_ibl: bool,
}

fn parse_mount(arg: &str) -> Result<MountConfig, String> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got {arg:?}"))?;
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got {arg:?}"));
    }
    Ok(MountConfig {
        name: name.to_owned(),
        path: path.to_owned(),
        default: false,
    })
}

impl InspectArgs {
    /// Merge the config file with the command line overrides.
    pub fn config(&self) -> Result<ConfigFile, GltfError> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let has_default = config.mount.iter().any(|m| m.default);
        config.mount.extend(self.mounts.iter().cloned());
        if config.mount.is_empty() {
            config.mount.push(MountConfig {
                name: "local".into(),
                path: ".".into(),
                default: true,
            });
        } else if !has_default && let Some(first) = config.mount.first_mut() {
            first.default = true;
        }

        if self.strict {
            config.loader.strict_extensions = true;
        }
        if self.no_ibl {
            config.loader.image_based_lighting = false;
        }
        Ok(config)
    }

    pub fn build_loader(&self) -> Result<GltfLoader, GltfError> {
        let config = self.config()?;
        Ok(GltfLoader::new(Fetcher::new(config.build_vfs())).with_config(config.loader))
    }
}
