//! Keyframe animation containers.
//!
//! - [`AnimationTrack`]: keyframe times plus one value block per keyframe
//! - [`NodeAnimation`]: every track that drives one node
//! - [`AnimationClip`]: the tracks one document animation contributed
//! - [`AnimationCollection`]: all node animations of a load, one per node

mod types;

pub use types::{
    AnimationClip, AnimationCollection, AnimationProperty, AnimationTrack, ClipChannel,
    Interpolation, NodeAnimation,
};
