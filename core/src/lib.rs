//! # Lumen Core
//!
//! Scene-graph types and the asynchronous glTF 2.0 loader that produces them.
//!
//! The collaborator modules ([`scene`], [`mesh`], [`material`], [`texture`],
//! [`sampler`], [`animation`]) hold the renderable object graph. The
//! [`gltf`] module (default `gltf` feature) resolves a document into it.

pub mod animation;
#[cfg(feature = "gltf")]
pub mod gltf;
pub mod material;
pub mod math;
pub mod mesh;
pub mod sampler;
pub mod scene;
pub mod texture;
