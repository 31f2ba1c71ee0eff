//! CPU-side sampler descriptors.
//!
//! - [`CpuSampler`]: filter and wrap configuration attached to a texture
//! - [`FilterMode`] / [`AddressMode`]: the individual settings

mod types;

pub use types::{AddressMode, CpuSampler, FilterMode};
