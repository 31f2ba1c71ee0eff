//! Scene graph data types.
//!
//! Resolved objects are immutable and `Arc`-shared: the same [`NodeObject`]
//! appears once in the hierarchy and again in every skin binding that uses it
//! as a bone.

use std::sync::Arc;

use crate::math::{self, Mat4};
use crate::mesh::MeshObject;

/// Node transform decomposed into translation, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Decompose a local matrix.
    pub fn from_matrix(m: &Mat4) -> Self {
        let (translation, rotation, scale) = math::decompose(m);
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose back into a local matrix.
    pub fn to_matrix(&self) -> Mat4 {
        math::compose(self.translation, self.rotation, self.scale)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What a resolved node is.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Bare transform node.
    Transform,
    /// Transform node referenced as a joint by some skin.
    Bone,
    /// Mesh (or primitive group) instance.
    Mesh(Arc<MeshObject>),
    /// Camera instance.
    Camera(Arc<SceneCamera>),
}

/// A resolved node with its local transform applied.
#[derive(Debug, Clone)]
pub struct NodeObject {
    /// Node name, if any.
    pub name: Option<String>,
    /// Local transform relative to parent.
    pub transform: NodeTransform,
    /// Node kind.
    pub kind: NodeKind,
}

impl NodeObject {
    /// Creates a node of the given kind with an identity transform.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: NodeTransform::IDENTITY,
            kind,
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Whether this node is a skin joint.
    pub fn is_bone(&self) -> bool {
        matches!(self.kind, NodeKind::Bone)
    }

    /// The mesh this node instantiates.
    pub fn mesh(&self) -> Option<&Arc<MeshObject>> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The camera this node instantiates.
    pub fn camera(&self) -> Option<&Arc<SceneCamera>> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }
}

// -- Cameras --

/// A camera definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    /// Camera name.
    pub name: Option<String>,
    /// Projection type and parameters.
    pub projection: CameraProjection,
}

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        /// Aspect ratio (width/height).
        aspect: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
    /// Orthographic projection with a symmetric frustum.
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
}

impl CameraProjection {
    /// Right-handed projection matrix with depth range [0, 1].
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Perspective {
                fov,
                aspect,
                znear,
                zfar,
            } => {
                let f = 1.0 / (fov.to_radians() * 0.5).tan();
                let depth = znear - zfar;
                let mut m = Mat4::zeros();
                m[(0, 0)] = f / aspect;
                m[(1, 1)] = f;
                m[(2, 2)] = zfar / depth;
                m[(2, 3)] = znear * zfar / depth;
                m[(3, 2)] = -1.0;
                m
            }
            Self::Orthographic {
                left,
                right,
                top,
                bottom,
                znear,
                zfar,
            } => {
                let (w, h, d) = (right - left, top - bottom, zfar - znear);
                let mut m = Mat4::identity();
                m[(0, 0)] = 2.0 / w;
                m[(1, 1)] = 2.0 / h;
                m[(2, 2)] = -1.0 / d;
                m[(0, 3)] = -(right + left) / w;
                m[(1, 3)] = -(top + bottom) / h;
                m[(2, 3)] = -znear / d;
                m
            }
        }
    }
}

// -- Hierarchy --

/// Bones and inverse bind matrices bound to one mesh instance.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    /// Index into the node's [`MeshObject::instances`].
    pub mesh: usize,
    /// Document indices of the bones, in joint order.
    pub joints: Vec<usize>,
    /// Resolved bone nodes, parallel to `joints`.
    pub bones: Vec<Arc<NodeObject>>,
    /// Inverse bind matrix per bone, parallel to `bones`.
    pub inverse_bind_matrices: Vec<Mat4>,
}

/// A node placed in a scene hierarchy.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Document index of the node.
    pub index: usize,
    /// The resolved node.
    pub node: Arc<NodeObject>,
    /// Skin bindings, one per mesh instance, when the node is skinned.
    pub skin_bindings: Vec<SkinBinding>,
    /// Child nodes forming the sub-tree.
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates a leaf node.
    pub fn new(index: usize, node: Arc<NodeObject>) -> Self {
        Self {
            index,
            node,
            skin_bindings: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Depth-first visit of this node and all descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

/// The root of one resolved scene.
#[derive(Debug, Clone, Default)]
pub struct SceneRoot {
    /// Scene name, if any.
    pub name: Option<String>,
    /// Root nodes of the scene.
    pub children: Vec<SceneNode>,
}

impl SceneRoot {
    /// Depth-first visit of every node in the scene.
    pub fn walk<'a>(&'a self, mut f: impl FnMut(&'a SceneNode)) {
        for child in &self.children {
            child.walk(&mut f);
        }
    }

    /// Total number of placed nodes.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.walk(|_| n += 1);
        n
    }

    /// First placed node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&SceneNode> {
        let mut found = None;
        self.walk(|node| {
            if found.is_none() && node.node.name.as_deref() == Some(name) {
                found = Some(node);
            }
        });
        found
    }
}
