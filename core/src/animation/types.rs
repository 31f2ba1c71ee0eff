use std::sync::Arc;

use crate::scene::NodeObject;

/// Node property a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationProperty {
    /// Translation `[x, y, z]`.
    Translation,
    /// Rotation quaternion `[x, y, z, w]`.
    Rotation,
    /// Scale `[x, y, z]`.
    Scale,
}

impl AnimationProperty {
    /// Floats per keyframe value.
    pub fn item_size(&self) -> usize {
        match self {
            Self::Translation | Self::Scale => 3,
            Self::Rotation => 4,
        }
    }
}

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    /// Each keyframe carries three blocks: in-tangent, value, out-tangent.
    CubicSpline,
}

/// One animated property of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTrack {
    /// Driven property.
    pub property: AnimationProperty,
    /// Interpolation between keyframes.
    pub interpolation: Interpolation,
    /// Keyframe times in seconds.
    pub times: Vec<f32>,
    /// Value blocks, each applied to the property as a unit.
    pub values: Vec<Vec<f32>>,
}

impl AnimationTrack {
    /// Duration in seconds (time of the last keyframe).
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value block at `index`.
    pub fn block(&self, index: usize) -> Option<&[f32]> {
        self.values.get(index).map(Vec::as_slice)
    }
}

/// All tracks that drive one node.
#[derive(Debug, Clone)]
pub struct NodeAnimation {
    /// Document index of the node.
    pub node_index: usize,
    /// The animated node.
    pub node: Arc<NodeObject>,
    /// Tracks in the order channels were resolved.
    pub tracks: Vec<Arc<AnimationTrack>>,
}

impl NodeAnimation {
    /// Creates an empty animation for `node`.
    pub fn new(node_index: usize, node: Arc<NodeObject>) -> Self {
        Self {
            node_index,
            node,
            tracks: Vec::new(),
        }
    }

    /// Longest track duration.
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .map(|t| t.duration())
            .fold(0.0, f32::max)
    }
}

/// One channel contributed by an animation.
#[derive(Debug, Clone)]
pub struct ClipChannel {
    /// Document index of the target node.
    pub node: usize,
    /// The track, shared with the node's [`NodeAnimation`].
    pub track: Arc<AnimationTrack>,
}

/// What one document animation resolved to.
#[derive(Debug, Clone, Default)]
pub struct AnimationClip {
    /// Animation name.
    pub name: Option<String>,
    /// Channels that produced tracks; skipped channels are absent.
    pub channels: Vec<ClipChannel>,
}

/// Node animations of one load, at most one per node.
#[derive(Debug, Clone, Default)]
pub struct AnimationCollection {
    /// Node animations in node index order.
    pub nodes: Vec<NodeAnimation>,
}

impl AnimationCollection {
    /// Animation driving the node with document index `node_index`.
    pub fn get(&self, node_index: usize) -> Option<&NodeAnimation> {
        self.nodes.iter().find(|a| a.node_index == node_index)
    }

    /// Number of animated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing is animated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of tracks across all nodes.
    pub fn track_count(&self) -> usize {
        self.nodes.iter().map(|a| a.tracks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn track(property: AnimationProperty, times: Vec<f32>) -> Arc<AnimationTrack> {
        let values = times.iter().map(|_| vec![0.0; property.item_size()]).collect();
        Arc::new(AnimationTrack {
            property,
            interpolation: Interpolation::Linear,
            times,
            values,
        })
    }

    #[test]
    fn item_sizes() {
        assert_eq!(AnimationProperty::Translation.item_size(), 3);
        assert_eq!(AnimationProperty::Rotation.item_size(), 4);
        assert_eq!(AnimationProperty::Scale.item_size(), 3);
    }

    #[test]
    fn durations_and_lookup() {
        let node = Arc::new(NodeObject::new(NodeKind::Transform));
        let mut anim = NodeAnimation::new(3, node);
        anim.tracks.push(track(AnimationProperty::Rotation, vec![0.0, 2.0]));
        anim.tracks.push(track(AnimationProperty::Scale, vec![0.0, 1.0, 1.5]));
        assert_eq!(anim.duration(), 2.0);
        assert_eq!(anim.tracks[0].block(1).map(<[f32]>::len), Some(4));

        let collection = AnimationCollection { nodes: vec![anim] };
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.track_count(), 2);
        assert!(collection.get(3).is_some());
        assert!(collection.get(0).is_none());
    }
}
