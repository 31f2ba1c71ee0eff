//! The glTF JSON document model.
//!
//! Plain serde structs mirroring the glTF 2.0 schema. Every cross-reference
//! stays an index; nothing is validated at parse time beyond JSON shape and
//! the asset version, so a dangling index only fails the entity that follows
//! it.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::error::GltfError;
use super::resolver::EntityType;

/// Top-level glTF document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub asset: Asset,
    /// Default scene index.
    pub scene: Option<usize>,
    pub scenes: Vec<SceneDef>,
    pub nodes: Vec<NodeDef>,
    pub meshes: Vec<MeshDef>,
    pub accessors: Vec<AccessorDef>,
    pub buffer_views: Vec<BufferViewDef>,
    pub buffers: Vec<BufferDef>,
    pub materials: Vec<MaterialDef>,
    pub textures: Vec<TextureDef>,
    pub images: Vec<ImageDef>,
    pub samplers: Vec<SamplerDef>,
    pub skins: Vec<SkinDef>,
    pub animations: Vec<AnimationDef>,
    pub cameras: Vec<CameraDef>,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
}

impl Document {
    /// Parse document JSON.
    pub fn from_slice(json: &[u8]) -> Result<Self, GltfError> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Fail unless `asset.version` is 2.0 or later.
    pub fn check_version(&self) -> Result<(), GltfError> {
        let major = self
            .asset
            .version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok());
        match major {
            Some(m) if m >= 2 => Ok(()),
            _ => Err(GltfError::UnsupportedVersion(self.asset.version.clone())),
        }
    }

    /// Length of the definition list for `ty`.
    pub fn count(&self, ty: EntityType) -> usize {
        match ty {
            EntityType::Scene => self.scenes.len(),
            EntityType::Node => self.nodes.len(),
            EntityType::Mesh => self.meshes.len(),
            EntityType::Accessor => self.accessors.len(),
            EntityType::BufferView => self.buffer_views.len(),
            EntityType::Buffer => self.buffers.len(),
            EntityType::Material => self.materials.len(),
            EntityType::Texture => self.textures.len(),
            EntityType::Skin => self.skins.len(),
            EntityType::Animation => self.animations.len(),
            EntityType::Camera => self.cameras.len(),
        }
    }

    /// Index of the first node named `name`.
    pub fn node_by_name(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    pub version: String,
    pub min_version: Option<String>,
    pub generator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneDef {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeDef {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub camera: Option<usize>,
    /// Column-major local matrix; takes precedence over TRS.
    pub matrix: Option<[f32; 16]>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeshDef {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrimitiveDef {
    pub attributes: Attributes,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    /// Topology code; absent means triangles (4).
    pub mode: Option<u32>,
}

/// Primitive attributes in document order.
///
/// Order matters: several attribute names may alias one slot and the first
/// one listed wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(pub Vec<(String, usize)>);

impl Attributes {
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(name, index)| (name.as_str(), *index))
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.iter().find(|(n, _)| *n == name).map(|(_, i)| i)
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AttributesVisitor;

        impl<'de> Visitor<'de> for AttributesVisitor {
            type Value = Attributes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of attribute names to accessor indices")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Attributes, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, index)) = map.next_entry::<String, usize>()? {
                    entries.push((name, index));
                }
                Ok(Attributes(entries))
            }
        }

        deserializer.deserialize_map(AttributesVisitor)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessorDef {
    pub name: Option<String>,
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: u32,
    pub normalized: bool,
    pub count: usize,
    #[serde(rename = "type")]
    pub ty: String,
    pub sparse: Option<SparseDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SparseDef {
    pub count: usize,
    pub indices: SparseIndicesDef,
    pub values: SparseValuesDef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SparseIndicesDef {
    pub buffer_view: usize,
    pub byte_offset: usize,
    pub component_type: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SparseValuesDef {
    pub buffer_view: usize,
    pub byte_offset: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BufferViewDef {
    pub name: Option<String>,
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BufferDef {
    pub name: Option<String>,
    /// Absent for the binary chunk of a `.glb`.
    pub uri: Option<String>,
    pub byte_length: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlphaModeDef {
    #[default]
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialDef {
    pub name: Option<String>,
    pub pbr_metallic_roughness: Option<PbrDef>,
    pub normal_texture: Option<TextureInfo>,
    pub occlusion_texture: Option<TextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: Option<[f32; 3]>,
    pub alpha_mode: AlphaModeDef,
    pub alpha_cutoff: Option<f32>,
    pub double_sided: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PbrDef {
    pub base_color_factor: Option<[f32; 4]>,
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: Option<f32>,
    pub roughness_factor: Option<f32>,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

/// Texture reference from a material.
///
/// `scale` is only meaningful on normal textures, `strength` on occlusion
/// textures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: usize,
    pub tex_coord: u32,
    pub scale: Option<f32>,
    pub strength: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextureDef {
    pub name: Option<String>,
    pub sampler: Option<usize>,
    pub source: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageDef {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerDef {
    pub name: Option<String>,
    pub mag_filter: Option<u32>,
    pub min_filter: Option<u32>,
    pub wrap_s: Option<u32>,
    pub wrap_t: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkinDef {
    pub name: Option<String>,
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Option<usize>,
    pub skeleton: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimationDef {
    pub name: Option<String>,
    pub channels: Vec<ChannelDef>,
    pub samplers: Vec<AnimationSamplerDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelDef {
    pub sampler: usize,
    pub target: TargetDef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetDef {
    pub node: Option<usize>,
    /// Deprecated free-form target, matched against node names.
    pub id: Option<String>,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimationSamplerDef {
    pub input: usize,
    pub output: usize,
    pub interpolation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CameraDef {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    pub perspective: Option<PerspectiveDef>,
    pub orthographic: Option<OrthographicDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerspectiveDef {
    /// Vertical field of view in radians.
    pub yfov: f32,
    pub aspect_ratio: Option<f32>,
    pub znear: Option<f32>,
    pub zfar: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrthographicDef {
    pub xmag: f32,
    pub ymag: f32,
    pub znear: f32,
    pub zfar: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document() {
        let doc = Document::from_slice(br#"{"asset":{"version":"2.0"}}"#).unwrap();
        doc.check_version().unwrap();
        assert!(doc.scenes.is_empty());
        assert_eq!(doc.count(EntityType::Node), 0);
        assert_eq!(doc.scene, None);
    }

    #[test]
    fn version_gate() {
        for version in ["1.0", "", "abc"] {
            let doc = Document {
                asset: Asset {
                    version: version.into(),
                    ..Default::default()
                },
                ..Default::default()
            };
            assert!(matches!(
                doc.check_version(),
                Err(GltfError::UnsupportedVersion(v)) if v == version
            ));
        }
        let doc = Document::from_slice(br#"{"asset":{"version":"3.1"}}"#).unwrap();
        assert!(doc.check_version().is_ok());
    }

    #[test]
    fn attributes_keep_document_order() {
        let json = br#"{"attributes":{"TEXCOORD":3,"POSITION":0,"TEXCOORD_0":1}}"#;
        let prim: PrimitiveDef = serde_json::from_slice(json).unwrap();
        let names: Vec<_> = prim.attributes.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["TEXCOORD", "POSITION", "TEXCOORD_0"]);
        assert_eq!(prim.attributes.get("TEXCOORD_0"), Some(1));
        assert_eq!(prim.mode, None);
    }

    #[test]
    fn camelcase_fields() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "bufferViews": [{"buffer": 0, "byteLength": 12, "byteOffset": 4, "byteStride": 12}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3"}],
            "materials": [{"alphaMode": "BLEND", "pbrMetallicRoughness": {"baseColorFactor": [1,0,0,1]}}],
            "animations": [{"channels": [{"sampler": 0, "target": {"id": "hip", "path": "rotation"}}],
                            "samplers": [{"input": 0, "output": 1}]}]
        }"#;
        let doc = Document::from_slice(json).unwrap();
        assert_eq!(doc.buffer_views[0].byte_stride, Some(12));
        assert_eq!(doc.accessors[0].ty, "VEC3");
        assert_eq!(doc.accessors[0].byte_offset, 0);
        assert_eq!(doc.materials[0].alpha_mode, AlphaModeDef::Blend);
        assert_eq!(doc.animations[0].channels[0].target.id.as_deref(), Some("hip"));
    }

    #[test]
    fn node_lookup_by_name() {
        let json = br#"{"asset":{"version":"2.0"},"nodes":[{"name":"a"},{"name":"b"}]}"#;
        let doc = Document::from_slice(json).unwrap();
        assert_eq!(doc.node_by_name("b"), Some(1));
        assert_eq!(doc.node_by_name("c"), None);
    }
}
