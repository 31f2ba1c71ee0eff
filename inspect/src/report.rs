//! Plain-text rendering of load results.

use std::collections::BTreeMap;
use std::fmt::Write;

use lumen_core::gltf::{Entity, GltfScene};
use lumen_core::mesh::MeshObject;
use lumen_core::scene::{CameraProjection, NodeKind, SceneNode, SceneRoot};

pub fn scene_report(loaded: &GltfScene) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} scene(s), {} camera(s), {} animation(s)",
        loaded.scenes.len(),
        loaded.cameras.len(),
        loaded.clips.len()
    );

    for (i, scene) in loaded.scenes.iter().enumerate() {
        let active = loaded
            .scene
            .as_ref()
            .is_some_and(|s| std::sync::Arc::ptr_eq(s, scene));
        write_scene(&mut out, i, scene, active);
    }

    for (i, camera) in loaded.cameras.iter().enumerate() {
        let name = camera.name.as_deref().unwrap_or("<unnamed>");
        match camera.projection {
            CameraProjection::Perspective { fov, znear, zfar, .. } => {
                let _ = writeln!(out, "camera {i} {name}: perspective {fov:.1} deg, {znear}..{zfar}");
            }
            CameraProjection::Orthographic { right, top, znear, zfar, .. } => {
                let _ = writeln!(out, "camera {i} {name}: orthographic {right}x{top}, {znear}..{zfar}");
            }
        }
    }

    for (i, clip) in loaded.clips.iter().enumerate() {
        let duration = clip
            .channels
            .iter()
            .map(|c| c.track.duration())
            .fold(0.0f32, f32::max);
        let _ = writeln!(
            out,
            "animation {i} {}: {} channel(s), {duration:.2}s",
            clip.name.as_deref().unwrap_or("<unnamed>"),
            clip.channels.len()
        );
    }

    for diagnostic in &loaded.diagnostics {
        let _ = writeln!(out, "warning: {diagnostic}");
    }
    out
}

fn write_scene(out: &mut String, index: usize, scene: &SceneRoot, active: bool) {
    let _ = writeln!(
        out,
        "scene {index} {}{} ({} nodes)",
        scene.name.as_deref().unwrap_or("<unnamed>"),
        if active { " [active]" } else { "" },
        scene.node_count()
    );
    for child in &scene.children {
        write_node(out, child, 1);
    }
}

fn write_node(out: &mut String, node: &SceneNode, depth: usize) {
    let name = node.node.name.as_deref().unwrap_or("<unnamed>");
    let kind = match &node.node.kind {
        NodeKind::Transform => String::new(),
        NodeKind::Bone => " bone".into(),
        NodeKind::Camera(_) => " camera".into(),
        NodeKind::Mesh(mesh) => match mesh.as_ref() {
            MeshObject::Single(instance) => {
                format!(" mesh ({} vertices)", instance.geometry.vertex_count())
            }
            MeshObject::Group { children, .. } => format!(" mesh ({} primitives)", children.len()),
        },
    };
    let skins = if node.skin_bindings.is_empty() {
        String::new()
    } else {
        format!(", {} joints", node.skin_bindings[0].bones.len())
    };
    let _ = writeln!(
        out,
        "{:indent$}#{} {name}{kind}{skins}",
        "",
        node.index,
        indent = depth * 2
    );
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

pub fn entity_report(entities: &BTreeMap<&'static str, Vec<Entity>>) -> String {
    let mut out = String::new();
    for (ty, list) in entities {
        let _ = writeln!(out, "{ty}: {}", list.len());
        for (i, entity) in list.iter().enumerate() {
            let _ = writeln!(out, "  {i}: {}", describe(entity));
        }
    }
    out
}

fn describe(entity: &Entity) -> String {
    match entity {
        Entity::Buffer(bytes) => format!("{} bytes", bytes.len()),
        Entity::BufferView(view) => format!("{} bytes", view.len()),
        Entity::Accessor(None) => "no data".into(),
        Entity::Accessor(Some(a)) => format!("{} x {}", a.count(), a.item_size()),
        Entity::Material(m) => format!(
            "{} {:?} [{}]",
            m.name.as_deref().unwrap_or("<unnamed>"),
            m.alpha_mode,
            m.uniforms
                .keys()
                .map(|slot| slot.uniform_name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Entity::Texture(t) => format!("{}x{}", t.width, t.height),
        Entity::Mesh(m) => format!(
            "{} ({} instances)",
            m.name().unwrap_or("<unnamed>"),
            m.instances().len()
        ),
        Entity::Node(n) => n.name.clone().unwrap_or_else(|| "<unnamed>".into()),
        Entity::Skin(s) => format!("{} joints", s.joints.len()),
        Entity::Animation(a) => format!("{} channels", a.channels.len()),
        Entity::Camera(c) => format!("{:?}", c.projection),
        Entity::Scene(s) => format!("{} nodes", s.node_count()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumen_core::scene::NodeObject;

    use super::*;

    #[test]
    fn test_node_tree_indentation() {
        let leaf = SceneNode::new(
            2,
            Arc::new(NodeObject::new(NodeKind::Bone).with_name(Some("knee".into()))),
        );
        let mut root = SceneNode::new(0, Arc::new(NodeObject::new(NodeKind::Transform)));
        root.children.push(leaf);
        let scene = SceneRoot {
            name: Some("main".into()),
            children: vec![root],
        };

        let mut out = String::new();
        write_scene(&mut out, 0, &scene, true);
        assert_eq!(
            out,
            "scene 0 main [active] (2 nodes)\n  #0 <unnamed>\n    #2 knee bone\n"
        );
    }

    #[test]
    fn test_material_lists_uniforms() {
        use lumen_core::material::{MaterialParams, UniformSlot, UniformValue};

        let material = MaterialParams::new()
            .with_name(Some("paint".into()))
            .with_uniform(UniformSlot::BaseColorFactor, UniformValue::Vec4([1.0; 4]))
            .with_uniform(UniformSlot::RoughnessFactor, UniformValue::Float(0.5));
        assert_eq!(
            describe(&Entity::Material(Arc::new(material))),
            "paint Opaque [u_BaseColorFactor, u_RoughnessFactor]"
        );
    }

    #[test]
    fn test_entity_listing() {
        let mut entities = BTreeMap::new();
        entities.insert(
            "buffers",
            vec![Entity::Buffer(Arc::from(vec![0u8; 16])), Entity::Accessor(None)],
        );
        let out = entity_report(&entities);
        assert_eq!(out, "buffers: 2\n  0: 16 bytes\n  1: no data\n");
    }
}
