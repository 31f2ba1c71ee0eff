use crate::sampler::CpuSampler;

/// Pixel format of a [`CpuTexture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, sRGB encoded.
    #[default]
    Rgba8Srgb,
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
}

impl TextureFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8Srgb | Self::Rgba8Unorm => 4,
        }
    }
}

/// A decoded 2D texture.
#[derive(Debug, Clone)]
pub struct CpuTexture {
    /// Texture name (from the document's texture or image entry).
    pub name: Option<String>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: TextureFormat,
    /// Tightly packed pixel rows, top to bottom.
    pub data: Vec<u8>,
    /// Sampling configuration.
    pub sampler: CpuSampler,
}

impl CpuTexture {
    /// Create a texture from RGBA8 pixels.
    ///
    /// Returns `None` if `data` does not hold exactly `width * height` pixels.
    pub fn rgba8(width: u32, height: u32, data: Vec<u8>, sampler: CpuSampler) -> Option<Self> {
        let format = TextureFormat::Rgba8Srgb;
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        (data.len() == expected).then_some(Self {
            name: None,
            width,
            height,
            format,
            data,
            sampler,
        })
    }

    /// Set the texture name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}
