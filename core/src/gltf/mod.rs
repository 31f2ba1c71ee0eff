//! Asynchronous glTF 2.0 loader.
//!
//! A document is a set of entity lists that reference each other by index:
//! scenes list nodes, nodes reference meshes, cameras and skins, meshes
//! reference accessors and materials, accessors reference buffer views,
//! buffer views reference buffers. The [`Resolver`] materializes any
//! `(EntityType, index)` on demand, resolving its dependencies first and
//! caching every result for the rest of the parse, so each entity is built
//! at most once no matter how many others share it.
//!
//! Failures are entity-local ([`ResolveError`]) unless they break the
//! document itself ([`GltfError`]). A broken accessor fails the meshes that
//! use it, not unrelated ones.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::gltf::{ConfigFile, GltfLoader};
//! use lumen_vfs::Fetcher;
//!
//! let config = ConfigFile::load("lumen.toml".as_ref())?;
//! let loader = GltfLoader::new(Fetcher::new(config.build_vfs()))
//!     .with_config(config.loader);
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build()?;
//! let loaded = rt.block_on(loader.load("models/fox.glb"))?;
//! if let Some(scene) = &loaded.scene {
//!     println!("{} nodes", scene.node_count());
//! }
//! ```

pub mod accessor;
mod animation;
mod assembler;
pub mod cache;
pub mod config;
pub mod document;
mod error;
pub mod glb;
mod loader;
mod material;
mod resolver;
#[cfg(test)]
mod tests;

pub use assembler::{SkinEntry, attribute_slot, local_transform};
pub use cache::EntityCache;
pub use config::{ConfigFile, LoaderConfig, MountConfig};
pub use document::Document;
pub use error::{GlbError, GltfError, ResolveError};
pub use loader::{GltfLoader, GltfScene};
pub use resolver::{Entity, EntityType, ParseContext, ResolveFuture, Resolver};
