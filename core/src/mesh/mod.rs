//! CPU-side mesh types.
//!
//! - [`BufferAttribute`] / [`AttributeArray`] - typed, element-strided vertex data
//! - [`Geometry`] - attributes keyed by [`AttributeSlot`], optional indices, topology
//! - [`MeshInstance`] - geometry + material + shader program
//! - [`MeshObject`] - one instance, or several grouped under a named parent

mod attribute;
mod geometry;
mod instance;

pub use attribute::{AttributeArray, BufferAttribute};
pub use geometry::{AttributeSlot, Geometry, PrimitiveTopology};
pub use instance::{MeshInstance, MeshObject};
