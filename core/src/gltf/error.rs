//! Error types for glTF loading.
//!
//! Two tiers: [`GltfError`] aborts the whole load, [`ResolveError`] fails a
//! single entity (and, transitively, whatever depends on it) while sibling
//! resolutions carry on.

use std::sync::Arc;

use thiserror::Error;

use lumen_vfs::VfsError;

use super::resolver::EntityType;

/// A failure confined to one entity.
///
/// `Clone` because a cached failure is handed to every caller that joins the
/// failed resolution.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// A cross-reference points past the end of its definition list.
    #[error("{kind} index {index} out of range")]
    IndexOutOfRange { kind: &'static str, index: usize },
    /// Byte stride present and different from the packed element size.
    #[error("accessor {accessor}: interleaved layout (stride {stride}, element size {element_size}) is not supported")]
    UnsupportedInterleaved {
        accessor: usize,
        stride: usize,
        element_size: usize,
    },
    /// Primitive mode other than triangles, strip or fan.
    #[error("mesh {mesh} primitive {primitive}: unsupported topology mode {mode}")]
    UnsupportedTopology {
        mesh: usize,
        primitive: usize,
        mode: u32,
    },
    /// Sparse patch on an element shape with more than four components.
    #[error("accessor {accessor}: sparse patch on {components}-component elements is not supported")]
    UnsupportedSparseShape { accessor: usize, components: usize },
    /// Unknown `componentType` code.
    #[error("accessor {accessor}: invalid component type {code}")]
    InvalidComponentType { accessor: usize, code: u32 },
    /// Unknown `type` string.
    #[error("accessor {accessor}: invalid element type {name:?}")]
    InvalidAccessorType { accessor: usize, name: String },
    /// A byte range reaches past the data it slices.
    #[error("{what}: range {offset}..{end} exceeds {len} bytes")]
    OutOfBounds {
        what: String,
        offset: usize,
        end: usize,
        len: usize,
    },
    /// A declared element count whose size overflows or cannot be allocated.
    #[error("{what}: {count} elements of {element_size} bytes cannot be allocated")]
    TooLarge {
        what: String,
        count: usize,
        element_size: usize,
    },
    /// A buffer without URI in a document that has no binary chunk.
    #[error("buffer {0} has no URI and the document carries no binary chunk")]
    MissingBinaryChunk(usize),
    /// A texture without an image, or an image with neither URI nor buffer view.
    #[error("{0} has no image data")]
    MissingImage(String),
    /// A camera whose type does not match its parameter block.
    #[error("camera {camera}: {reason}")]
    InvalidCamera { camera: usize, reason: &'static str },
    /// A fetch through the VFS failed.
    #[error("failed to fetch {uri}")]
    Fetch {
        uri: String,
        #[source]
        source: Arc<VfsError>,
    },
    /// An image could not be decoded.
    #[error("image {image}: {message}")]
    ImageDecode { image: usize, message: String },
    /// A node's children lead back to the node itself.
    #[error("node {0} is its own ancestor")]
    CyclicHierarchy(usize),
    /// A resolution task was cancelled or panicked.
    #[error("resolution task aborted: {0}")]
    TaskAborted(String),
    /// A cached entity has a different type than requested.
    #[error("expected {expected} entity")]
    EntityMismatch { expected: EntityType },
}

/// Errors that abort the whole load.
#[derive(Debug, Error)]
pub enum GltfError {
    /// The document is not valid glTF JSON.
    #[error("glTF parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// `asset.version` below 2.0.
    #[error("unsupported glTF version {0:?}, 2.0 or later is required")]
    UnsupportedVersion(String),
    /// Malformed binary container.
    #[error(transparent)]
    Glb(#[from] GlbError),
    /// An entity type name that is not part of glTF.
    #[error("unknown entity type {0:?}")]
    UnknownEntityType(String),
    /// A required extension that is not implemented (strict mode only).
    #[error("required extension {0:?} is not supported")]
    UnsupportedExtension(String),
    /// The top-level document could not be fetched.
    #[error("failed to fetch document")]
    Fetch(#[from] VfsError),
    /// An entity the load depends on failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Loader configuration could not be parsed.
    #[error("invalid loader config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Errors in the binary (`.glb`) container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlbError {
    /// First four bytes are not `glTF`.
    #[error("bad GLB magic 0x{0:08X}")]
    BadMagic(u32),
    /// Container version other than 2.
    #[error("unsupported GLB container version {0}")]
    UnsupportedVersion(u32),
    /// Header or chunk runs past the end of the data.
    #[error("GLB truncated: needed {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    /// Header length larger than the data.
    #[error("GLB header declares {declared} bytes, have {available}")]
    LengthMismatch { declared: usize, available: usize },
    /// No JSON chunk.
    #[error("GLB has no JSON chunk")]
    MissingJsonChunk,
    /// More than one chunk of a type that must be unique.
    #[error("GLB has more than one {0} chunk")]
    DuplicateChunk(&'static str),
}
