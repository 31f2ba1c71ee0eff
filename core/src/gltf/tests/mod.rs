//! Loader and resolver tests over synthetic documents.
//!
//! Buffers are served from a [`MemoryProvider`] mounted as the default VFS
//! source, so documents reference them with plain relative URIs.

use std::future::Future;
use std::sync::Arc;

use tokio::task::LocalSet;

use lumen_vfs::{Fetcher, MemoryProvider, Vfs};

use crate::gltf::{Document, ParseContext, Resolver};

mod load_test;

/// Run `future` on a current-thread runtime inside a [`LocalSet`].
fn block_on_local<F: Future>(future: F) -> F::Output {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");
    LocalSet::new().block_on(&rt, future)
}

/// Fetcher reading the given files from memory.
fn memory_fetcher(files: &[(&str, Vec<u8>)]) -> Fetcher {
    let memory = MemoryProvider::new();
    for (path, data) in files {
        memory.insert(*path, data.clone());
    }
    let mut vfs = Vfs::new();
    vfs.mount("memory", memory);
    vfs.set_default("memory");
    Fetcher::new(vfs)
}

/// Resolver over a JSON document.
fn resolver_for(json: &str, fetcher: Fetcher) -> Resolver {
    let document = Document::from_slice(json.as_bytes()).expect("invalid test document");
    Resolver::new(ParseContext::new(Arc::new(document), fetcher))
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn u16_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// One triangle: three VEC3 positions (36 bytes) then three u16 indices
/// (6 bytes, padded to 8).
fn triangle_bin() -> Vec<u8> {
    let mut bin = f32_bytes(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    bin.extend(u16_bytes(&[0, 1, 2]));
    bin.extend([0, 0]);
    bin
}

/// Document drawing [`triangle_bin`]; the buffer has no URI when `uri` is `None`.
fn triangle_json(uri: Option<&str>) -> serde_json::Value {
    let mut buffer = serde_json::json!({"byteLength": 44});
    if let Some(uri) = uri {
        buffer["uri"] = uri.into();
    }
    serde_json::json!({
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"name": "main", "nodes": [0]}],
        "nodes": [{"name": "triangle", "mesh": 0}],
        "meshes": [{
            "name": "tri",
            "primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]
        }],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3"},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 6}
        ],
        "buffers": [buffer]
    })
}
