//! Material data types.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::texture::CpuTexture;

/// Well-known uniform slots of the PBR metallic-roughness model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniformSlot {
    /// Base color factor `[r, g, b, a]`.
    BaseColorFactor,
    /// Base color texture.
    BaseColorTexture,
    /// Metallic factor (0.0–1.0).
    MetallicFactor,
    /// Roughness factor (0.0–1.0).
    RoughnessFactor,
    /// Metallic-roughness texture (B=metallic, G=roughness).
    MetallicRoughnessTexture,
    /// Normal map texture.
    NormalTexture,
    /// Normal map scale factor.
    NormalScale,
    /// Occlusion texture.
    OcclusionTexture,
    /// Occlusion strength (0.0–1.0).
    OcclusionStrength,
    /// Emissive factor `[r, g, b]`.
    EmissiveFactor,
    /// Emissive texture.
    EmissiveTexture,
    /// Alpha cutoff threshold (for [`AlphaMode::Mask`]).
    AlphaCutoff,
}

impl UniformSlot {
    /// Shader-side uniform name.
    pub fn uniform_name(&self) -> &'static str {
        match self {
            Self::BaseColorFactor => "u_BaseColorFactor",
            Self::BaseColorTexture => "u_BaseColorSampler",
            Self::MetallicFactor => "u_MetallicFactor",
            Self::RoughnessFactor => "u_RoughnessFactor",
            Self::MetallicRoughnessTexture => "u_MetallicRoughnessSampler",
            Self::NormalTexture => "u_NormalSampler",
            Self::NormalScale => "u_NormalScale",
            Self::OcclusionTexture => "u_OcclusionSampler",
            Self::OcclusionStrength => "u_OcclusionStrength",
            Self::EmissiveFactor => "u_EmissiveFactor",
            Self::EmissiveTexture => "u_EmissiveSampler",
            Self::AlphaCutoff => "u_AlphaCutoff",
        }
    }
}

/// A texture bound to a uniform slot.
#[derive(Debug, Clone)]
pub struct TextureBinding {
    /// The decoded texture, shared by every material that references it.
    pub texture: Arc<CpuTexture>,
    /// Texture coordinate set index (0, 1, …).
    pub tex_coord: u32,
}

impl PartialEq for TextureBinding {
    fn eq(&self, other: &Self) -> bool {
        self.tex_coord == other.tex_coord && Arc::ptr_eq(&self.texture, &other.texture)
    }
}

/// A typed uniform value.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Single float (metallic, roughness, normal scale, occlusion strength, alpha cutoff).
    Float(f32),
    /// 3-component vector (emissive factor).
    Vec3([f32; 3]),
    /// 4-component vector (base color factor).
    Vec4([f32; 4]),
    /// Resolved texture.
    Texture(TextureBinding),
}

/// Preprocessor-style shader feature flag.
///
/// Material features come from the textures a material binds, geometry
/// features from the attributes a primitive carries, and the rest are
/// engine toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderFeature {
    BaseColorMap,
    MetallicRoughnessMap,
    NormalMap,
    OcclusionMap,
    EmissiveMap,
    AlphaMask,
    Normals,
    Tangents,
    Uv,
    VertexColor,
    Skinning,
    Ibl,
    ManualSrgb,
    TexLod,
}

impl ShaderFeature {
    /// The `#define` the feature turns on.
    pub fn define(&self) -> &'static str {
        match self {
            Self::BaseColorMap => "HAS_BASECOLORMAP",
            Self::MetallicRoughnessMap => "HAS_METALROUGHNESSMAP",
            Self::NormalMap => "HAS_NORMALMAP",
            Self::OcclusionMap => "HAS_OCCLUSIONMAP",
            Self::EmissiveMap => "HAS_EMISSIVEMAP",
            Self::AlphaMask => "ALPHA_MASK",
            Self::Normals => "HAS_NORMALS",
            Self::Tangents => "HAS_TANGENTS",
            Self::Uv => "HAS_UV",
            Self::VertexColor => "HAS_VERTEXCOLOR",
            Self::Skinning => "USE_SKINNING",
            Self::Ibl => "USE_IBL",
            Self::ManualSrgb => "MANUAL_SRGB",
            Self::TexLod => "USE_TEX_LOD",
        }
    }
}

/// Alpha rendering mode.
///
/// Affects pipeline state (blend configuration), not shader bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    /// Fully opaque (alpha ignored).
    #[default]
    Opaque,
    /// Alpha masking with cutoff threshold.
    Mask,
    /// Full alpha blending.
    Blend,
}

/// Render state derived from a material.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOptions {
    /// Alpha blending enabled. True iff the alpha mode is [`AlphaMode::Blend`].
    pub transparent: bool,
    /// Discard threshold when the alpha mode is [`AlphaMode::Mask`].
    pub alpha_cutoff: Option<f32>,
    /// Disable back-face culling.
    pub double_sided: bool,
}

/// Resolved material: uniforms, feature flags and render state.
///
/// The [`Default`] value is the material used for primitives that reference
/// none: no uniforms, no features, opaque single-sided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialParams {
    /// Material name.
    pub name: Option<String>,
    /// Alpha rendering mode.
    pub alpha_mode: AlphaMode,
    /// Uniform slot values.
    pub uniforms: BTreeMap<UniformSlot, UniformValue>,
    /// Feature flags contributed by this material.
    pub features: BTreeSet<ShaderFeature>,
    /// Pipeline state.
    pub options: RenderOptions,
}

impl MaterialParams {
    /// Creates an empty material.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the material name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set a uniform slot.
    #[must_use]
    pub fn with_uniform(mut self, slot: UniformSlot, value: UniformValue) -> Self {
        self.uniforms.insert(slot, value);
        self
    }

    /// Turn on a feature flag.
    #[must_use]
    pub fn with_feature(mut self, feature: ShaderFeature) -> Self {
        self.features.insert(feature);
        self
    }

    /// Set the alpha mode and derive the matching render options.
    #[must_use]
    pub fn with_alpha_mode(mut self, mode: AlphaMode, cutoff: f32) -> Self {
        self.alpha_mode = mode;
        self.options.transparent = mode == AlphaMode::Blend;
        self.options.alpha_cutoff = (mode == AlphaMode::Mask).then_some(cutoff);
        if mode == AlphaMode::Mask {
            self.features.insert(ShaderFeature::AlphaMask);
            self.uniforms
                .insert(UniformSlot::AlphaCutoff, UniformValue::Float(cutoff));
        }
        self
    }

    /// Set double-sided rendering.
    #[must_use]
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.options.double_sided = double_sided;
        self
    }

    /// Look up a uniform value.
    pub fn get(&self, slot: UniformSlot) -> Option<&UniformValue> {
        self.uniforms.get(&slot)
    }

    /// Get a float uniform.
    pub fn get_float(&self, slot: UniformSlot) -> Option<f32> {
        match self.get(slot)? {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get a vec3 uniform.
    pub fn get_vec3(&self, slot: UniformSlot) -> Option<[f32; 3]> {
        match self.get(slot)? {
            UniformValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Get a vec4 uniform.
    pub fn get_vec4(&self, slot: UniformSlot) -> Option<[f32; 4]> {
        match self.get(slot)? {
            UniformValue::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    /// Get a texture binding.
    pub fn get_texture(&self, slot: UniformSlot) -> Option<&TextureBinding> {
        match self.get(slot)? {
            UniformValue::Texture(t) => Some(t),
            _ => None,
        }
    }
}

/// Shader program configuration for one mesh instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramConfig {
    /// Every feature the program is compiled with.
    pub features: BTreeSet<ShaderFeature>,
}

impl ProgramConfig {
    /// Merge material and geometry features.
    pub fn new(
        material: &BTreeSet<ShaderFeature>,
        geometry: &BTreeSet<ShaderFeature>,
    ) -> Self {
        Self {
            features: material.union(geometry).copied().collect(),
        }
    }

    /// Add a feature when `enabled`.
    #[must_use]
    pub fn with_toggle(mut self, feature: ShaderFeature, enabled: bool) -> Self {
        if enabled {
            self.features.insert(feature);
        }
        self
    }

    /// Whether the program has `feature`.
    pub fn has(&self, feature: ShaderFeature) -> bool {
        self.features.contains(&feature)
    }

    /// `#define` lines in feature order.
    pub fn defines(&self) -> Vec<&'static str> {
        self.features.iter().map(ShaderFeature::define).collect()
    }
}
