//! Scene graph assembly: meshes, nodes, skins, cameras, and scene hierarchies.
//!
//! Nodes resolve independently of their place in the hierarchy. A scene
//! settles every node and skin first, then links the tree with a synchronous
//! depth-first walk, binding skins to mesh instances on the way. Skin joints
//! may live anywhere in the document, which is why binding waits for the
//! whole node set.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::material::{ProgramConfig, ShaderFeature};
use crate::math::Mat4;
use crate::mesh::{
    AttributeSlot, BufferAttribute, Geometry, MeshInstance, MeshObject, PrimitiveTopology,
};
use crate::scene::{
    CameraProjection, NodeKind, NodeObject, NodeTransform, SceneCamera, SceneNode, SceneRoot,
    SkinBinding,
};

use super::document::{Document, NodeDef};
use super::error::ResolveError;
use super::resolver::{Entity, EntityType, ResolveFuture, Resolver, join_all};

const DEFAULT_ZNEAR: f32 = 1.0;
const DEFAULT_ZFAR: f32 = 2e6;

/// A resolved skin. Bones are bound later, per scene.
#[derive(Debug, Clone)]
pub struct SkinEntry {
    pub name: Option<String>,
    /// Joint node indices, in joint order.
    pub joints: Vec<usize>,
    /// One MAT4 per joint when present.
    pub inverse_bind_matrices: Option<Arc<BufferAttribute>>,
    /// Declared skeleton root.
    pub skeleton: Option<usize>,
}

impl SkinEntry {
    /// Inverse bind matrix of joint slot `joint`; identity when the skin has none.
    pub fn inverse_bind_matrix(&self, joint: usize) -> Mat4 {
        self.inverse_bind_matrices
            .as_ref()
            .and_then(|ibm| ibm.matrix4(joint))
            .unwrap_or_else(Mat4::identity)
    }
}

/// Topology for a primitive `mode`; absent means triangles.
fn topology_from_mode(mode: Option<u32>) -> Option<PrimitiveTopology> {
    match mode.unwrap_or(4) {
        4 => Some(PrimitiveTopology::Triangles),
        5 => Some(PrimitiveTopology::TriangleStrip),
        6 => Some(PrimitiveTopology::TriangleFan),
        _ => None,
    }
}

/// Slot for a glTF attribute name, including the legacy unsuffixed names.
pub fn attribute_slot(name: &str) -> Option<AttributeSlot> {
    let slot = match name {
        "POSITION" => AttributeSlot::Position,
        "NORMAL" => AttributeSlot::Normal,
        "TANGENT" => AttributeSlot::Tangent,
        "TEXCOORD" => AttributeSlot::TexCoord(0),
        "COLOR" => AttributeSlot::Color(0),
        "JOINT" => AttributeSlot::Joints(0),
        "WEIGHT" => AttributeSlot::Weights(0),
        _ => {
            let (prefix, set) = name.rsplit_once('_')?;
            let set = set.parse().ok()?;
            match prefix {
                "TEXCOORD" => AttributeSlot::TexCoord(set),
                "COLOR" => AttributeSlot::Color(set),
                "JOINTS" => AttributeSlot::Joints(set),
                "WEIGHTS" => AttributeSlot::Weights(set),
                _ => return None,
            }
        }
    };
    Some(slot)
}

/// Local transform of a node. A matrix, when present, wins over TRS.
pub fn local_transform(def: &NodeDef) -> NodeTransform {
    match &def.matrix {
        Some(cols) => NodeTransform::from_matrix(&Mat4::from_column_slice(cols)),
        None => NodeTransform {
            translation: def.translation.unwrap_or(NodeTransform::IDENTITY.translation),
            rotation: def.rotation.unwrap_or(NodeTransform::IDENTITY.rotation),
            scale: def.scale.unwrap_or(NodeTransform::IDENTITY.scale),
        },
    }
}

impl Resolver {
    pub(super) async fn load_mesh(&self, index: usize) -> Result<Arc<MeshObject>, ResolveError> {
        let def = &self.ctx.document.meshes[index];
        let skinned = self.ctx.is_skinned_mesh(index);

        let futures = (0..def.primitives.len())
            .map(|primitive| {
                let this = self.clone();
                Box::pin(async move { this.load_primitive(index, primitive, skinned).await })
                    as ResolveFuture<MeshInstance>
            })
            .collect();
        let results = join_all(futures, |p| format!("mesh {index} primitive {p}")).await;

        // A failed primitive drops out of the group; the mesh fails only
        // when none is left.
        let mut instances: Vec<(usize, MeshInstance)> = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (primitive, result) in results.into_iter().enumerate() {
            match result {
                Ok(instance) => instances.push((primitive, instance)),
                Err(e) => {
                    log::warn!("Mesh {index} primitive {primitive} skipped: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        if instances.is_empty()
            && let Some(e) = first_error
        {
            return Err(e);
        }

        let mesh = if def.primitives.len() == 1
            && let Some((_, instance)) = instances.pop()
        {
            MeshObject::Single(instance.with_name(def.name.clone()))
        } else {
            let base = def.name.clone().unwrap_or_else(|| format!("mesh{index}"));
            let children = instances
                .into_iter()
                .map(|(i, instance)| instance.with_name(Some(format!("{base}_prim{i}"))))
                .collect();
            MeshObject::Group {
                name: def.name.clone(),
                children,
            }
        };
        Ok(Arc::new(mesh))
    }

    async fn load_primitive(
        &self,
        mesh: usize,
        primitive: usize,
        skinned: bool,
    ) -> Result<MeshInstance, ResolveError> {
        let def = &self.ctx.document.meshes[mesh].primitives[primitive];
        let topology = topology_from_mode(def.mode).ok_or(ResolveError::UnsupportedTopology {
            mesh,
            primitive,
            mode: def.mode.unwrap_or_default(),
        })?;

        let material = match def.material {
            Some(material) => self.material(material).await?,
            None => self.ctx.default_material.clone(),
        };

        // First name bound to a slot wins; later aliases are dropped.
        let mut seen = BTreeSet::new();
        let mut bindings = Vec::new();
        for (name, accessor) in def.attributes.iter() {
            match attribute_slot(name) {
                Some(slot) if seen.insert(slot) => bindings.push((slot, accessor)),
                Some(_) => log::debug!(
                    "Mesh {mesh} primitive {primitive}: attribute {name} aliases an earlier one, ignored"
                ),
                None => log::debug!("Mesh {mesh} primitive {primitive}: unknown attribute {name}"),
            }
        }

        let accessors = bindings
            .iter()
            .map(|&(_, accessor)| accessor)
            .chain(def.indices)
            .map(|accessor| {
                let this = self.clone();
                Box::pin(async move { this.accessor(accessor).await })
                    as ResolveFuture<Option<Arc<BufferAttribute>>>
            })
            .collect();
        let mut resolved = join_all(accessors, |i| format!("mesh {mesh} accessor {i}"))
            .await
            .into_iter();

        let mut geometry = Geometry::new(topology);
        for ((slot, _), attribute) in bindings.iter().zip(resolved.by_ref()) {
            if let Some(attribute) = attribute? {
                geometry.set_attribute(*slot, attribute);
            }
        }
        if let Some(indices) = resolved.next() {
            if let Some(indices) = indices? {
                geometry.set_indices(indices);
            }
        }

        let config = &self.ctx.config;
        let program = ProgramConfig::new(&material.features, &geometry.features())
            .with_toggle(ShaderFeature::Ibl, config.image_based_lighting)
            .with_toggle(ShaderFeature::ManualSrgb, config.manual_srgb)
            .with_toggle(ShaderFeature::TexLod, config.texture_lod)
            .with_toggle(ShaderFeature::Skinning, skinned);
        Ok(MeshInstance::new(geometry, material, program))
    }

    pub(super) async fn load_node(&self, index: usize) -> Result<Arc<NodeObject>, ResolveError> {
        let def = &self.ctx.document.nodes[index];

        let kind = if self.ctx.is_bone(index) {
            NodeKind::Bone
        } else if let Some(mesh) = def.mesh {
            NodeKind::Mesh(self.mesh(mesh).await?)
        } else if let Some(camera) = def.camera {
            NodeKind::Camera(self.camera(camera).await?)
        } else {
            NodeKind::Transform
        };
        if def.skin.is_some() && !matches!(kind, NodeKind::Mesh(_)) {
            log::warn!("Node {index} has a skin but no mesh to bind it to");
        }

        Ok(Arc::new(
            NodeObject::new(kind)
                .with_name(def.name.clone())
                .with_transform(local_transform(def)),
        ))
    }

    pub(super) async fn load_skin(&self, index: usize) -> Result<Arc<SkinEntry>, ResolveError> {
        let def = &self.ctx.document.skins[index];
        let inverse_bind_matrices = match def.inverse_bind_matrices {
            Some(accessor) => self.accessor(accessor).await?,
            None => None,
        };
        if let Some(ibm) = &inverse_bind_matrices {
            if ibm.item_size() != 16 {
                log::warn!("Skin {index}: inverse bind matrices are not MAT4, using identity");
            } else if ibm.count() < def.joints.len() {
                log::warn!(
                    "Skin {index}: {} inverse bind matrices for {} joints",
                    ibm.count(),
                    def.joints.len()
                );
            }
        }
        Ok(Arc::new(SkinEntry {
            name: def.name.clone(),
            joints: def.joints.clone(),
            inverse_bind_matrices,
            skeleton: def.skeleton,
        }))
    }

    pub(super) fn load_camera(&self, index: usize) -> Result<Arc<SceneCamera>, ResolveError> {
        let def = &self.ctx.document.cameras[index];
        let invalid = |reason| ResolveError::InvalidCamera {
            camera: index,
            reason,
        };
        let projection = match def.ty.as_str() {
            "perspective" => {
                let p = def
                    .perspective
                    .as_ref()
                    .ok_or_else(|| invalid("missing perspective parameters"))?;
                CameraProjection::Perspective {
                    fov: p.yfov.to_degrees(),
                    aspect: p.aspect_ratio.unwrap_or(1.0),
                    znear: p.znear.unwrap_or(DEFAULT_ZNEAR),
                    zfar: p.zfar.unwrap_or(DEFAULT_ZFAR),
                }
            }
            "orthographic" => {
                let o = def
                    .orthographic
                    .as_ref()
                    .ok_or_else(|| invalid("missing orthographic parameters"))?;
                CameraProjection::Orthographic {
                    left: -o.xmag,
                    right: o.xmag,
                    top: o.ymag,
                    bottom: -o.ymag,
                    znear: o.znear,
                    zfar: o.zfar,
                }
            }
            _ => return Err(invalid("unknown camera type")),
        };
        Ok(Arc::new(SceneCamera {
            name: def.name.clone(),
            projection,
        }))
    }

    pub(super) async fn load_scene(&self, index: usize) -> Result<Arc<SceneRoot>, ResolveError> {
        let document = self.ctx.document.clone();
        let def = &document.scenes[index];

        let (nodes, skins) = tokio::join!(
            self.resolve_all_settled(EntityType::Node),
            self.resolve_all_settled(EntityType::Skin),
        );
        let nodes = nodes
            .into_iter()
            .map(|node| match node? {
                Entity::Node(node) => Ok(node),
                _ => Err(ResolveError::EntityMismatch {
                    expected: EntityType::Node,
                }),
            })
            .collect();
        let skins = skins
            .into_iter()
            .map(|skin| match skin? {
                Entity::Skin(skin) => Ok(skin),
                _ => Err(ResolveError::EntityMismatch {
                    expected: EntityType::Skin,
                }),
            })
            .collect();

        let mut builder = HierarchyBuilder {
            document: &document,
            nodes,
            skins,
            on_path: vec![false; document.nodes.len()],
        };
        let children = def
            .nodes
            .iter()
            .map(|&root| builder.build(root))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(SceneRoot {
            name: def.name.clone(),
            children,
        }))
    }
}

/// Depth-first hierarchy walk over settled nodes and skins.
struct HierarchyBuilder<'a> {
    document: &'a Document,
    nodes: Vec<Result<Arc<NodeObject>, ResolveError>>,
    skins: Vec<Result<Arc<SkinEntry>, ResolveError>>,
    /// Nodes on the current root-to-leaf path.
    on_path: Vec<bool>,
}

impl HierarchyBuilder<'_> {
    fn build(&mut self, index: usize) -> Result<SceneNode, ResolveError> {
        let out_of_range = ResolveError::IndexOutOfRange {
            kind: EntityType::Node.name(),
            index,
        };
        let def = self.document.nodes.get(index).ok_or(out_of_range.clone())?;
        let node = self.nodes.get(index).ok_or(out_of_range)?.clone()?;
        if self.on_path[index] {
            return Err(ResolveError::CyclicHierarchy(index));
        }

        let mut scene_node = SceneNode::new(index, node);
        if let Some(skin) = def.skin {
            scene_node.skin_bindings = self.bind_skin(index, skin, &scene_node.node)?;
        }

        self.on_path[index] = true;
        let children = def
            .children
            .iter()
            .map(|&child| self.build(child))
            .collect::<Result<Vec<_>, _>>();
        self.on_path[index] = false;
        scene_node.children = children?;
        Ok(scene_node)
    }

    /// One binding per mesh instance of a skinned node. Joints that did not
    /// resolve are skipped.
    fn bind_skin(
        &self,
        node_index: usize,
        skin_index: usize,
        node: &NodeObject,
    ) -> Result<Vec<SkinBinding>, ResolveError> {
        let skin = self
            .skins
            .get(skin_index)
            .ok_or(ResolveError::IndexOutOfRange {
                kind: EntityType::Skin.name(),
                index: skin_index,
            })?
            .clone()?;
        let Some(mesh) = node.mesh() else {
            return Ok(Vec::new());
        };

        let mut template = SkinBinding {
            mesh: 0,
            joints: Vec::with_capacity(skin.joints.len()),
            bones: Vec::with_capacity(skin.joints.len()),
            inverse_bind_matrices: Vec::with_capacity(skin.joints.len()),
        };
        for (slot, &joint) in skin.joints.iter().enumerate() {
            match self.nodes.get(joint) {
                Some(Ok(bone)) => {
                    template.joints.push(joint);
                    template.bones.push(bone.clone());
                    template
                        .inverse_bind_matrices
                        .push(skin.inverse_bind_matrix(slot));
                }
                Some(Err(e)) => log::warn!(
                    "Skin {skin_index} on node {node_index}: joint {joint} failed to resolve ({e}), skipped"
                ),
                None => log::warn!(
                    "Skin {skin_index} on node {node_index}: joint {joint} does not exist, skipped"
                ),
            }
        }

        Ok((0..mesh.instances().len())
            .map(|mesh| SkinBinding {
                mesh,
                ..template.clone()
            })
            .collect())
    }
}
