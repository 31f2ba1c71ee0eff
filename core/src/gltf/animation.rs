//! Animation assembly.
//!
//! Channels become [`AnimationTrack`]s grouped per target node. Every node
//! gets one [`NodeAnimation`] for the whole parse, shared by all channels of
//! all animations that target it; each animation entity resolves to the
//! [`AnimationClip`] of channels it contributed.

use std::sync::Arc;

use crate::animation::{
    AnimationClip, AnimationProperty, AnimationTrack, ClipChannel, Interpolation, NodeAnimation,
};
use crate::scene::NodeObject;

use super::error::ResolveError;
use super::resolver::{ResolveFuture, Resolver, join_all};

fn parse_property(path: &str) -> Option<AnimationProperty> {
    match path {
        "translation" => Some(AnimationProperty::Translation),
        "rotation" => Some(AnimationProperty::Rotation),
        "scale" => Some(AnimationProperty::Scale),
        _ => None,
    }
}

fn parse_interpolation(name: Option<&str>) -> Interpolation {
    match name {
        None | Some("LINEAR") => Interpolation::Linear,
        Some("STEP") => Interpolation::Step,
        Some("CUBICSPLINE") => Interpolation::CubicSpline,
        Some(other) => {
            log::warn!("Unknown interpolation {other:?}, using LINEAR");
            Interpolation::Linear
        }
    }
}

/// Split flat keyframe values into blocks of `size` floats.
fn split_blocks(values: &[f32], size: usize) -> Vec<Vec<f32>> {
    values.chunks(size.max(1)).map(<[f32]>::to_vec).collect()
}

struct ResolvedChannel {
    node_index: usize,
    node: Arc<NodeObject>,
    track: Arc<AnimationTrack>,
}

impl Resolver {
    pub(super) async fn load_animation(&self, index: usize) -> Result<Arc<AnimationClip>, ResolveError> {
        let def = &self.ctx.document.animations[index];

        let futures = (0..def.channels.len())
            .map(|channel| {
                let this = self.clone();
                Box::pin(async move { this.load_channel(index, channel).await })
                    as ResolveFuture<Option<ResolvedChannel>>
            })
            .collect();
        let channels = join_all(futures, |c| format!("animation {index} channel {c}"))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        // Nothing is registered until every channel resolved. Registration
        // follows channel order so track order is stable.
        let mut clip = AnimationClip {
            name: def.name.clone(),
            channels: Vec::new(),
        };
        let mut animations = self.ctx.animations.borrow_mut();
        for channel in channels.into_iter().flatten() {
            animations
                .entry(channel.node_index)
                .or_insert_with(|| NodeAnimation::new(channel.node_index, channel.node))
                .tracks
                .push(channel.track.clone());
            clip.channels.push(ClipChannel {
                node: channel.node_index,
                track: channel.track,
            });
        }
        drop(animations);
        log::debug!(
            "Animation {index}: {} of {} channels produced tracks",
            clip.channels.len(),
            def.channels.len()
        );
        Ok(Arc::new(clip))
    }

    /// `Ok(None)` for a channel that is skipped rather than failed.
    async fn load_channel(
        &self,
        animation: usize,
        channel: usize,
    ) -> Result<Option<ResolvedChannel>, ResolveError> {
        let document = &self.ctx.document;
        let def = &document.animations[animation];
        let target = &def.channels[channel].target;

        let Some(property) = parse_property(&target.path) else {
            if target.path == "weights" {
                log::info!("Animation {animation} channel {channel}: morph target weights are not supported, skipped");
            } else {
                log::warn!(
                    "Animation {animation} channel {channel}: unknown path {:?}, skipped",
                    target.path
                );
            }
            return Ok(None);
        };

        let node_index = match (target.node, &target.id) {
            (Some(node), _) => Some(node),
            (None, Some(id)) => document.node_by_name(id),
            (None, None) => None,
        };
        let Some(node_index) = node_index else {
            log::warn!("Animation {animation} channel {channel}: no target node, skipped");
            return Ok(None);
        };
        let node = match self.node(node_index).await {
            Ok(node) => node,
            Err(e) => {
                log::warn!(
                    "Animation {animation} channel {channel}: target node {node_index} failed ({e}), skipped"
                );
                return Ok(None);
            }
        };

        let sampler_index = def.channels[channel].sampler;
        let sampler = def
            .samplers
            .get(sampler_index)
            .ok_or(ResolveError::IndexOutOfRange {
                kind: "animation sampler",
                index: sampler_index,
            })?;
        let (input, output) = tokio::join!(
            self.accessor(sampler.input),
            self.accessor(sampler.output)
        );
        let times = input?.map(|a| a.to_f32_vec()).unwrap_or_default();
        let values = match output? {
            Some(output) => {
                if output.item_size() != property.item_size() {
                    log::warn!(
                        "Animation {animation} channel {channel}: {}-component values for {property:?}",
                        output.item_size()
                    );
                }
                split_blocks(&output.to_f32_vec(), output.item_size())
            }
            None => Vec::new(),
        };

        let track = Arc::new(AnimationTrack {
            property,
            interpolation: parse_interpolation(sampler.interpolation.as_deref()),
            times,
            values,
        });
        Ok(Some(ResolvedChannel {
            node_index,
            node,
            track,
        }))
    }
}
