//! CPU-side texture types.
//!
//! Provides [`CpuTexture`] for holding decoded RGBA8 pixel data together with
//! the sampler it is read through.

mod types;

pub use types::{CpuTexture, TextureFormat};
