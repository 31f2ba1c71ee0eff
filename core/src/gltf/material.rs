//! Material and texture loading.

use std::sync::Arc;

use image::ImageFormat;

use crate::material::{
    AlphaMode, MaterialParams, ShaderFeature, TextureBinding, UniformSlot, UniformValue,
};
use crate::sampler::{AddressMode, CpuSampler, FilterMode};
use crate::texture::CpuTexture;

use super::document::{AlphaModeDef, SamplerDef, TextureInfo};
use super::error::ResolveError;
use super::resolver::{ResolveFuture, Resolver, join_all};

const DEFAULT_ALPHA_CUTOFF: f32 = 0.5;

impl Resolver {
    pub(super) async fn load_material(&self, index: usize) -> Result<Arc<MaterialParams>, ResolveError> {
        let def = &self.ctx.document.materials[index];
        let pbr = def.pbr_metallic_roughness.clone().unwrap_or_default();

        let mut params = MaterialParams::new()
            .with_name(def.name.clone())
            .with_uniform(
                UniformSlot::BaseColorFactor,
                UniformValue::Vec4(pbr.base_color_factor.unwrap_or([1.0; 4])),
            )
            .with_uniform(
                UniformSlot::MetallicFactor,
                UniformValue::Float(pbr.metallic_factor.unwrap_or(1.0)),
            )
            .with_uniform(
                UniformSlot::RoughnessFactor,
                UniformValue::Float(pbr.roughness_factor.unwrap_or(1.0)),
            )
            .with_uniform(
                UniformSlot::EmissiveFactor,
                UniformValue::Vec3(def.emissive_factor.unwrap_or([0.0; 3])),
            );
        if let Some(normal) = &def.normal_texture {
            params = params.with_uniform(
                UniformSlot::NormalScale,
                UniformValue::Float(normal.scale.unwrap_or(1.0)),
            );
        }
        if let Some(occlusion) = &def.occlusion_texture {
            params = params.with_uniform(
                UniformSlot::OcclusionStrength,
                UniformValue::Float(occlusion.strength.unwrap_or(1.0)),
            );
        }

        let maps: Vec<(&TextureInfo, UniformSlot, ShaderFeature)> = [
            (
                pbr.base_color_texture.as_ref(),
                UniformSlot::BaseColorTexture,
                ShaderFeature::BaseColorMap,
            ),
            (
                pbr.metallic_roughness_texture.as_ref(),
                UniformSlot::MetallicRoughnessTexture,
                ShaderFeature::MetallicRoughnessMap,
            ),
            (
                def.normal_texture.as_ref(),
                UniformSlot::NormalTexture,
                ShaderFeature::NormalMap,
            ),
            (
                def.occlusion_texture.as_ref(),
                UniformSlot::OcclusionTexture,
                ShaderFeature::OcclusionMap,
            ),
            (
                def.emissive_texture.as_ref(),
                UniformSlot::EmissiveTexture,
                ShaderFeature::EmissiveMap,
            ),
        ]
        .into_iter()
        .filter_map(|(info, slot, feature)| info.map(|info| (info, slot, feature)))
        .collect();

        let futures = maps
            .iter()
            .map(|(info, _, _)| {
                let this = self.clone();
                let texture = info.index;
                Box::pin(async move { this.texture(texture).await })
                    as ResolveFuture<Arc<CpuTexture>>
            })
            .collect();
        let textures = join_all(futures, |i| format!("material {index} texture {i}")).await;

        for ((info, slot, feature), texture) in maps.into_iter().zip(textures) {
            let binding = TextureBinding {
                texture: texture?,
                tex_coord: info.tex_coord,
            };
            params = params
                .with_uniform(slot, UniformValue::Texture(binding))
                .with_feature(feature);
        }

        let alpha_mode = match def.alpha_mode {
            AlphaModeDef::Opaque => AlphaMode::Opaque,
            AlphaModeDef::Mask => AlphaMode::Mask,
            AlphaModeDef::Blend => AlphaMode::Blend,
        };
        Ok(Arc::new(
            params
                .with_alpha_mode(alpha_mode, def.alpha_cutoff.unwrap_or(DEFAULT_ALPHA_CUTOFF))
                .with_double_sided(def.double_sided),
        ))
    }

    pub(super) async fn load_texture(&self, index: usize) -> Result<Arc<CpuTexture>, ResolveError> {
        let document = &self.ctx.document;
        let def = &document.textures[index];
        let source = def
            .source
            .ok_or_else(|| ResolveError::MissingImage(format!("texture {index}")))?;
        let image = document
            .images
            .get(source)
            .ok_or(ResolveError::IndexOutOfRange {
                kind: "image",
                index: source,
            })?;
        let sampler = match def.sampler {
            Some(sampler) => document
                .samplers
                .get(sampler)
                .map(sampler_from_def)
                .ok_or(ResolveError::IndexOutOfRange {
                    kind: "sampler",
                    index: sampler,
                })?,
            None => CpuSampler::default(),
        };

        let bytes = match (image.buffer_view, &image.uri) {
            (Some(view), _) => self.buffer_view(view).await?.bytes().to_vec(),
            (None, Some(uri)) => self.fetch(uri).await?,
            (None, None) => return Err(ResolveError::MissingImage(format!("image {source}"))),
        };
        let mime_type = image.mime_type.clone();
        let (width, height, pixels) =
            tokio::task::spawn_blocking(move || decode_image(&bytes, mime_type.as_deref()))
                .await
                .map_err(|e| ResolveError::TaskAborted(format!("image {source} decode: {e}")))?
                .map_err(|message| ResolveError::ImageDecode {
                    image: source,
                    message,
                })?;
        log::debug!("Decoded image {source}: {width}x{height}");

        let texture = CpuTexture::rgba8(width, height, pixels, sampler).ok_or_else(|| {
            ResolveError::ImageDecode {
                image: source,
                message: "pixel data does not match dimensions".into(),
            }
        })?;
        Ok(Arc::new(
            texture.with_name(def.name.clone().or_else(|| image.name.clone())),
        ))
    }
}

/// Decode to tightly packed RGBA8. The MIME type, when known, picks the codec.
fn decode_image(bytes: &[u8], mime_type: Option<&str>) -> Result<(u32, u32, Vec<u8>), String> {
    let decoded = match mime_type.and_then(ImageFormat::from_mime_type) {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| e.to_string())?;

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

fn sampler_from_def(def: &SamplerDef) -> CpuSampler {
    let mut sampler = CpuSampler {
        name: def.name.clone(),
        ..CpuSampler::default()
    };
    if let Some(code) = def.mag_filter {
        match map_mag_filter(code) {
            Some(filter) => sampler.mag_filter = filter,
            None => log::warn!("Unknown magFilter {code}, using default"),
        }
    }
    if let Some(code) = def.min_filter {
        match map_min_filter(code) {
            Some((filter, mipmap)) => {
                sampler.min_filter = filter;
                sampler.mipmap_filter = mipmap;
            }
            None => log::warn!("Unknown minFilter {code}, using default"),
        }
    }
    sampler.address_mode_u = map_wrapping(def.wrap_s);
    sampler.address_mode_v = map_wrapping(def.wrap_t);
    sampler
}

fn map_mag_filter(code: u32) -> Option<FilterMode> {
    match code {
        9728 => Some(FilterMode::Nearest),
        9729 => Some(FilterMode::Linear),
        _ => None,
    }
}

/// Minification filter and mip filter for a glTF `minFilter` code.
fn map_min_filter(code: u32) -> Option<(FilterMode, Option<FilterMode>)> {
    use FilterMode::{Linear, Nearest};
    match code {
        9728 => Some((Nearest, None)),
        9729 => Some((Linear, None)),
        9984 => Some((Nearest, Some(Nearest))),
        9985 => Some((Linear, Some(Nearest))),
        9986 => Some((Nearest, Some(Linear))),
        9987 => Some((Linear, Some(Linear))),
        _ => None,
    }
}

fn map_wrapping(code: Option<u32>) -> AddressMode {
    match code {
        Some(33071) => AddressMode::ClampToEdge,
        Some(33648) => AddressMode::MirrorRepeat,
        Some(10497) | None => AddressMode::Repeat,
        Some(other) => {
            log::warn!("Unknown wrap mode {other}, using repeat");
            AddressMode::Repeat
        }
    }
}
