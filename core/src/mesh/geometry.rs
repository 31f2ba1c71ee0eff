//! Vertex attribute sets.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::material::ShaderFeature;

use super::attribute::BufferAttribute;

/// How vertices are assembled into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Every three vertices form a triangle.
    #[default]
    Triangles,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Triangles share the first vertex.
    TriangleFan,
}

/// Semantic slot a vertex attribute is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSlot {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
}

impl AttributeSlot {
    /// Shader attribute name.
    pub fn shader_name(&self) -> String {
        match self {
            Self::Position => "a_Position".to_owned(),
            Self::Normal => "a_Normal".to_owned(),
            Self::Tangent => "a_Tangent".to_owned(),
            Self::TexCoord(set) => format!("a_UV_{set}"),
            Self::Color(set) => format!("a_Color_{set}"),
            Self::Joints(set) => format!("a_Joint_{set}"),
            Self::Weights(set) => format!("a_Weight_{set}"),
        }
    }
}

/// Vertex data of one primitive.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Topology the vertices are drawn with.
    pub topology: PrimitiveTopology,
    attributes: BTreeMap<AttributeSlot, Arc<BufferAttribute>>,
    indices: Option<Arc<BufferAttribute>>,
}

impl Geometry {
    /// Creates an empty geometry.
    pub fn new(topology: PrimitiveTopology) -> Self {
        Self {
            topology,
            attributes: BTreeMap::new(),
            indices: None,
        }
    }

    /// Bind `attribute` to `slot` unless the slot is already taken.
    ///
    /// Returns `false` (and keeps the existing binding) when occupied.
    pub fn set_attribute(&mut self, slot: AttributeSlot, attribute: Arc<BufferAttribute>) -> bool {
        if self.attributes.contains_key(&slot) {
            return false;
        }
        self.attributes.insert(slot, attribute);
        true
    }

    /// Attribute bound to `slot`.
    pub fn attribute(&self, slot: AttributeSlot) -> Option<&Arc<BufferAttribute>> {
        self.attributes.get(&slot)
    }

    /// All bound attributes in slot order.
    pub fn attributes(&self) -> impl Iterator<Item = (AttributeSlot, &Arc<BufferAttribute>)> {
        self.attributes.iter().map(|(slot, attr)| (*slot, attr))
    }

    /// Set the index buffer.
    pub fn set_indices(&mut self, indices: Arc<BufferAttribute>) {
        self.indices = Some(indices);
    }

    /// Index buffer, if the primitive is indexed.
    pub fn indices(&self) -> Option<&Arc<BufferAttribute>> {
        self.indices.as_ref()
    }

    /// Number of vertices (element count of the position attribute).
    pub fn vertex_count(&self) -> usize {
        self.attribute(AttributeSlot::Position)
            .map_or(0, |attr| attr.count())
    }

    /// Shader features implied by the bound attributes.
    pub fn features(&self) -> BTreeSet<ShaderFeature> {
        self.attributes
            .keys()
            .filter_map(|slot| match slot {
                AttributeSlot::Normal => Some(ShaderFeature::Normals),
                AttributeSlot::Tangent => Some(ShaderFeature::Tangents),
                AttributeSlot::TexCoord(0) => Some(ShaderFeature::Uv),
                AttributeSlot::Color(0) => Some(ShaderFeature::VertexColor),
                _ => None,
            })
            .collect()
    }
}
