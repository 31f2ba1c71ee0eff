//! Scene graph types produced by the loader.
//!
//! - [`NodeObject`] / [`NodeKind`]: a resolved node: transform, bone, mesh or camera
//! - [`NodeTransform`]: TRS transform using plain arrays
//! - [`SceneCamera`] / [`CameraProjection`]: camera definitions
//! - [`SceneNode`]: a node placed in a hierarchy, with its skin bindings
//! - [`SkinBinding`]: bones and inverse bind matrices for one mesh instance
//! - [`SceneRoot`]: the root of one scene

mod types;

pub use types::{
    CameraProjection, NodeKind, NodeObject, NodeTransform, SceneCamera, SceneNode, SceneRoot,
    SkinBinding,
};
