//! CPU-side material parameters and shader program configuration.
//!
//! A material is a structured record rather than an open uniform bag:
//!
//! - [`MaterialParams`]: uniform slots, feature flags and render state
//! - [`UniformSlot`] / [`UniformValue`]: named slot with a typed value
//! - [`ShaderFeature`]: preprocessor-style flag (`HAS_NORMALMAP`, ...)
//! - [`RenderOptions`] / [`AlphaMode`]: pipeline state derived from the material
//! - [`ProgramConfig`]: the full feature set a mesh's shader is built with

mod types;

pub use types::{
    AlphaMode, MaterialParams, ProgramConfig, RenderOptions, ShaderFeature, TextureBinding,
    UniformSlot, UniformValue,
};
