//! Renderable mesh instances.

use std::sync::Arc;

use crate::material::{MaterialParams, ProgramConfig, ShaderFeature};

use super::geometry::Geometry;

/// One drawable primitive: geometry, material and the program it is drawn with.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    /// Instance name.
    pub name: Option<String>,
    /// Vertex data.
    pub geometry: Geometry,
    /// Material, shared with every other primitive that uses it.
    pub material: Arc<MaterialParams>,
    /// Shader program configuration.
    pub program: ProgramConfig,
}

impl MeshInstance {
    /// Creates a mesh instance.
    pub fn new(geometry: Geometry, material: Arc<MaterialParams>, program: ProgramConfig) -> Self {
        Self {
            name: None,
            geometry,
            material,
            program,
        }
    }

    /// Set the instance name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Whether this is a skin-capable instance.
    pub fn is_skinned(&self) -> bool {
        self.program.has(ShaderFeature::Skinning)
    }
}

/// What a mesh definition resolves to.
#[derive(Debug, Clone)]
pub enum MeshObject {
    /// A single-primitive mesh.
    Single(MeshInstance),
    /// A multi-primitive mesh: one instance per primitive under a transform
    /// parent named after the mesh.
    Group {
        /// Parent name.
        name: Option<String>,
        /// Instances in primitive order.
        children: Vec<MeshInstance>,
    },
}

impl MeshObject {
    /// Name of the mesh object (the parent name for groups).
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Single(instance) => instance.name.as_deref(),
            Self::Group { name, .. } => name.as_deref(),
        }
    }

    /// All mesh instances in primitive order.
    pub fn instances(&self) -> &[MeshInstance] {
        match self {
            Self::Single(instance) => std::slice::from_ref(instance),
            Self::Group { children, .. } => children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PrimitiveTopology;

    fn instance(name: &str) -> MeshInstance {
        MeshInstance::new(
            Geometry::new(PrimitiveTopology::Triangles),
            Arc::new(MaterialParams::default()),
            ProgramConfig::default(),
        )
        .with_name(Some(name.to_owned()))
    }

    #[test]
    fn single_and_group_instances() {
        let single = MeshObject::Single(instance("a"));
        assert_eq!(single.instances().len(), 1);
        assert_eq!(single.name(), Some("a"));

        let group = MeshObject::Group {
            name: Some("car".into()),
            children: vec![instance("car_prim0"), instance("car_prim1")],
        };
        assert_eq!(group.instances().len(), 2);
        assert_eq!(group.name(), Some("car"));
        assert_eq!(group.instances()[1].name.as_deref(), Some("car_prim1"));
    }

    #[test]
    fn skinning_follows_program() {
        let mut mesh = instance("skinned");
        assert!(!mesh.is_skinned());
        mesh.program = mesh.program.with_toggle(ShaderFeature::Skinning, true);
        assert!(mesh.is_skinned());
    }
}
