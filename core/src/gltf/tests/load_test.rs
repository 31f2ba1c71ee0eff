//! End-to-end loads through [`GltfLoader`]: containers, URI forms,
//! extension checks and texture decoding.

use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;

use lumen_vfs::VfsError;

use crate::gltf::glb::{self, CHUNK_BIN, CHUNK_JSON};
use crate::gltf::{GltfError, GltfLoader, LoaderConfig, ResolveError};
use crate::material::{ShaderFeature, UniformSlot};
use crate::sampler::{AddressMode, FilterMode};

use super::*;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
        .block_on(future)
}

fn triangle_vertex_count(scene: &crate::gltf::GltfScene) -> usize {
    let root = scene.scene.as_ref().expect("no active scene");
    let node = root.find_by_name("triangle").expect("triangle node missing");
    node.node.mesh().expect("node has no mesh").instances()[0]
        .geometry
        .vertex_count()
}

#[test]
fn test_version_one_rejected_before_fetch() {
    let json = json!({
        "asset": {"version": "1.0"},
        "buffers": [{"uri": "never.bin", "byteLength": 4}]
    });
    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.parse(json.to_string().as_bytes(), ""));
    assert!(matches!(result, Err(GltfError::UnsupportedVersion(v)) if v == "1.0"));
}

#[test]
fn test_invalid_json_is_document_error() {
    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.parse(b"{\"asset\": ", ""));
    assert!(matches!(result, Err(GltfError::Json(_))));
}

#[test]
fn test_glb_with_unknown_chunk() {
    let json = triangle_json(None).to_string();
    let bin = triangle_bin();
    let data = glb::build(&[
        (CHUNK_JSON, json.as_bytes()),
        (0x5458_4554, b"vendor payload"),
        (CHUNK_BIN, &bin),
    ]);

    let loader = GltfLoader::new(memory_fetcher(&[]));
    let loaded = block_on(loader.parse(&data, "")).expect("GLB load failed");

    assert_eq!(triangle_vertex_count(&loaded), 3);
    assert_eq!(loaded.scene.as_ref().unwrap().name.as_deref(), Some("main"));
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_glb_buffer_without_bin_chunk() {
    let json = triangle_json(None).to_string();
    let data = glb::build(&[(CHUNK_JSON, json.as_bytes())]);

    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.parse(&data, ""));
    assert!(matches!(
        result,
        Err(GltfError::Resolve(ResolveError::MissingBinaryChunk(0)))
    ));
}

#[test]
fn test_relative_uri_resolves_against_document_directory() {
    let json = triangle_json(Some("my%20buffer.bin")).to_string();
    let fetcher = memory_fetcher(&[
        ("models/tri.gltf", json.into_bytes()),
        ("models/my buffer.bin", triangle_bin()),
    ]);

    let loader = GltfLoader::new(fetcher);
    let loaded = block_on(loader.load("models/tri.gltf")).expect("load failed");
    assert_eq!(triangle_vertex_count(&loaded), 3);
    assert_eq!(loaded.scenes.len(), 1);
}

#[test]
fn test_data_uri_buffer() {
    // 1.0f32, little-endian
    let json = json!({
        "asset": {"version": "2.0"},
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 1, "type": "SCALAR"}],
        "bufferViews": [{"buffer": 0, "byteLength": 4}],
        "buffers": [{"uri": "data:application/octet-stream;base64,AACAPw==", "byteLength": 4}]
    });
    let resolver = resolver_for(&json.to_string(), memory_fetcher(&[]));
    let attribute = block_on_local(resolver.accessor(0))
        .expect("accessor failed")
        .expect("accessor has data");
    assert_eq!(attribute.get_x(0), Some(1.0));
}

#[test]
fn test_blob_uri_buffer() {
    let fetcher = memory_fetcher(&[]);
    fetcher.register_blob("5f1c-aa90", triangle_bin());
    let json = triangle_json(Some("blob:5f1c-aa90")).to_string();

    let loader = GltfLoader::new(fetcher);
    let loaded = block_on(loader.parse(json.as_bytes(), "")).expect("load failed");
    assert_eq!(triangle_vertex_count(&loaded), 3);
}

#[test]
fn test_missing_buffer_fails_with_fetch_error() {
    let json = triangle_json(Some("gone.bin")).to_string();
    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.parse(json.as_bytes(), "models"));

    match result {
        Err(GltfError::Resolve(ResolveError::Fetch { uri, source })) => {
            assert_eq!(uri, "gone.bin");
            assert!(matches!(source.as_ref(), VfsError::NotFound(_)));
        }
        other => panic!("expected a fetch error, got {other:?}"),
    }
}

#[test]
fn test_missing_document_fails_with_fetch_error() {
    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.load("nowhere/scene.gltf"));
    assert!(matches!(result, Err(GltfError::Fetch(VfsError::NotFound(_)))));
}

#[test]
fn test_extensions_become_diagnostics() {
    let mut json = triangle_json(Some("tri.bin"));
    json["extensionsUsed"] = json!(["KHR_materials_clearcoat", "KHR_draco_mesh_compression"]);
    json["extensionsRequired"] = json!(["KHR_draco_mesh_compression"]);
    let json = json.to_string();

    let loader = GltfLoader::new(memory_fetcher(&[("tri.bin", triangle_bin())]));
    let loaded = block_on(loader.parse(json.as_bytes(), "")).expect("lenient load failed");
    assert_eq!(loaded.diagnostics.len(), 2);
    assert!(loaded.diagnostics[0].contains("KHR_draco_mesh_compression"));
    assert!(loaded.diagnostics[1].contains("KHR_materials_clearcoat"));

    let strict = loader.clone().with_config(LoaderConfig {
        strict_extensions: true,
        ..LoaderConfig::default()
    });
    let result = block_on(strict.parse(json.as_bytes(), ""));
    assert!(matches!(
        result,
        Err(GltfError::UnsupportedExtension(name)) if name == "KHR_draco_mesh_compression"
    ));
}

#[test]
fn test_load_with_callbacks() {
    let json = triangle_json(Some("tri.bin")).to_string();
    let loader = GltfLoader::new(memory_fetcher(&[
        ("scene.gltf", json.into_bytes()),
        ("tri.bin", triangle_bin()),
    ]));

    let mut loaded = None;
    let mut failed = None;
    block_on(loader.load_with(
        "scene.gltf",
        |scene| loaded = Some(scene),
        |e| failed = Some(e),
    ));
    assert!(failed.is_none());
    assert_eq!(triangle_vertex_count(&loaded.expect("on_load not called")), 3);

    let mut loaded = None;
    let mut failed = None;
    block_on(loader.load_with(
        "missing.gltf",
        |scene| loaded = Some(scene),
        |e| failed = Some(e),
    ));
    assert!(loaded.is_none());
    assert!(matches!(failed, Some(GltfError::Fetch(_))));
}

fn checker_png() -> Vec<u8> {
    let image = image::RgbaImage::from_fn(2, 2, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    });
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .expect("failed to encode PNG");
    png.into_inner()
}

#[test]
fn test_png_texture_decoded_and_shared() {
    let mut json = triangle_json(Some("tri.bin"));
    json["images"] = json!([{"uri": "checker.png", "name": "checker"}]);
    json["samplers"] = json!([{"magFilter": 9728, "minFilter": 9986, "wrapS": 33071}]);
    json["textures"] = json!([{"source": 0, "sampler": 0}]);
    json["materials"] = json!([{
        "pbrMetallicRoughness": {"baseColorTexture": {"index": 0}},
        "emissiveTexture": {"index": 0, "texCoord": 1}
    }]);
    json["meshes"][0]["primitives"][0]["material"] = json!(0);
    let json = json.to_string();

    let loader = GltfLoader::new(memory_fetcher(&[
        ("textured/scene.gltf", json.into_bytes()),
        ("textured/tri.bin", triangle_bin()),
        ("textured/checker.png", checker_png()),
    ]));
    let loaded = block_on(loader.load("textured/scene.gltf")).expect("load failed");

    let root = loaded.scene.as_ref().unwrap();
    let node = root.find_by_name("triangle").unwrap();
    let instance = &node.node.mesh().unwrap().instances()[0];
    let material = &instance.material;

    let base = material
        .get_texture(UniformSlot::BaseColorTexture)
        .expect("base color texture missing");
    let emissive = material
        .get_texture(UniformSlot::EmissiveTexture)
        .expect("emissive texture missing");
    assert!(Arc::ptr_eq(&base.texture, &emissive.texture));
    assert_eq!(base.tex_coord, 0);
    assert_eq!(emissive.tex_coord, 1);

    let texture = &base.texture;
    assert_eq!(texture.name.as_deref(), Some("checker"));
    assert_eq!((texture.width, texture.height), (2, 2));
    assert_eq!(&texture.data[..8], &[255, 255, 255, 255, 0, 0, 0, 255]);
    assert_eq!(texture.sampler.mag_filter, FilterMode::Nearest);
    assert_eq!(texture.sampler.address_mode_u, AddressMode::ClampToEdge);
    assert_eq!(texture.sampler.address_mode_v, AddressMode::Repeat);

    assert!(instance.program.has(ShaderFeature::BaseColorMap));
    assert!(instance.program.has(ShaderFeature::EmissiveMap));
    assert!(!instance.program.has(ShaderFeature::NormalMap));
}

#[test]
fn test_corrupt_image_fails_material() {
    let mut json = triangle_json(Some("tri.bin"));
    json["images"] = json!([{"uri": "broken.png", "mimeType": "image/png"}]);
    json["textures"] = json!([{"source": 0}]);
    json["materials"] = json!([{"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}}]);
    json["meshes"][0]["primitives"][0]["material"] = json!(0);
    let json = json.to_string();

    let loader = GltfLoader::new(memory_fetcher(&[
        ("tri.bin", triangle_bin()),
        ("broken.png", b"not a png".to_vec()),
    ]));
    let result = block_on(loader.parse(json.as_bytes(), ""));
    assert!(matches!(
        result,
        Err(GltfError::Resolve(ResolveError::ImageDecode { image: 0, .. }))
    ));
}

#[test]
fn test_load_entities_by_type_name() {
    let json = triangle_json(Some("tri.bin")).to_string();
    let loader = GltfLoader::new(memory_fetcher(&[
        ("scene.gltf", json.into_bytes()),
        ("tri.bin", triangle_bin()),
    ]));

    let entities = block_on(loader.load_entities("scene.gltf", &["meshes", "accessor"]))
        .expect("load failed");
    assert_eq!(entities.len(), 2);
    assert_eq!(entities["meshes"].len(), 1);
    assert_eq!(entities["accessors"].len(), 2);
    assert!(matches!(entities["meshes"][0], crate::gltf::Entity::Mesh(_)));
}

#[test]
fn test_unknown_entity_type_is_fatal() {
    // nothing is mounted, so reaching the fetch would fail differently
    let loader = GltfLoader::new(memory_fetcher(&[]));
    let result = block_on(loader.load_entities("scene.gltf", &["meshes", "lights"]));
    assert!(matches!(result, Err(GltfError::UnknownEntityType(name)) if name == "lights"));
}
