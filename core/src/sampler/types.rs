//! Texture sampling state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Behavior outside `[0, 1]` texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    ClampToEdge,
    #[default]
    Repeat,
    MirrorRepeat,
}

/// Sampler attached to a decoded texture.
///
/// The default is what a texture without a sampler gets: repeat on both
/// axes, linear magnification, trilinear minification.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSampler {
    pub name: Option<String>,
    /// Wrapping along U (glTF `wrapS`).
    pub address_mode_u: AddressMode,
    /// Wrapping along V (glTF `wrapT`).
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// Filter between mip levels; `None` samples the base level only.
    pub mipmap_filter: Option<FilterMode>,
}

impl CpuSampler {
    pub fn uses_mipmaps(&self) -> bool {
        self.mipmap_filter.is_some()
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self {
            name: None,
            address_mode_u: AddressMode::default(),
            address_mode_v: AddressMode::default(),
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: Some(FilterMode::Linear),
        }
    }
}
