//! Compilation of a keyframe sequence into sparse per-joint tracks, and sampling.
//!
//! Model:
//! - A joint (or channel) gets a track iff at least one playable keyframe defines it.
//! - Only keyframes that define the joint contribute a sample; gaps are not filled
//!   with identity, the neighbouring defining samples span them.
//! - Segment [Si -> S(i+1)] is shaped by Si.easing; step holds Si until S(i+1).time.
//! - Queries before the first / after the last sample hold that endpoint.
//! - Samples at equal times keep sequence order; the last of them wins at that instant.

use std::collections::BTreeMap;

use log::debug;
use posekit_api_core::{Pose, PoseWriteBatch, Quat, SkeletonJoint, Vec3};
use serde::{Deserialize, Serialize};

use crate::data::{Easing, TimelineSequence};
use crate::interp::functions::eased_value;
use crate::interp::Interpolate;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample<V> {
    pub time: f32,
    pub value: V,
    pub easing: Easing,
}

/// Time-sorted samples for one joint or channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track<V> {
    samples: Vec<Sample<V>>,
}

impl<V> Default for Track<V> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<V: Interpolate> Track<V> {
    /// Samples must arrive in non-decreasing time order.
    fn push(&mut self, sample: Sample<V>) {
        debug_assert!(self.samples.last().map_or(true, |s| s.time <= sample.time));
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample<V>] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Value at `time`; `None` only for an empty track.
    pub fn sample(&self, time: f32) -> Option<V> {
        let n = self.samples.len();
        if n == 0 {
            return None;
        }
        // number of samples at or before `time`
        let idx = self.samples.partition_point(|s| s.time <= time);
        if idx == 0 {
            return Some(self.samples[0].value);
        }
        if idx == n {
            return Some(self.samples[n - 1].value);
        }
        let left = &self.samples[idx - 1];
        let right = &self.samples[idx];
        let span = right.time - left.time;
        let local = if span > 0.0 {
            ((time - left.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(eased_value(left.value, right.value, local, left.easing))
    }
}

/// Interpolated drive signal compiled from a sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledTracks {
    pub rotations: BTreeMap<SkeletonJoint, Track<Quat>>,
    pub positions: BTreeMap<SkeletonJoint, Track<Vec3>>,
    pub expressions: BTreeMap<String, Track<f32>>,
}

impl CompiledTracks {
    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty() && self.positions.is_empty() && self.expressions.is_empty()
    }

    /// Evaluate every track at `time` into a pose.
    pub fn sample_pose(&self, time: f32) -> Pose {
        let mut pose = Pose::new();
        for (joint, track) in &self.rotations {
            if let Some(q) = track.sample(time) {
                pose = pose.with_joint(*joint, q);
            }
        }
        if let Some(p) = self
            .positions
            .get(&SkeletonJoint::ROOT)
            .and_then(|track| track.sample(time))
        {
            pose = pose.with_root(p);
        }
        for (channel, track) in &self.expressions {
            if let Some(w) = track.sample(time) {
                pose = pose.with_expression(channel.clone(), w);
            }
        }
        pose
    }

    /// Evaluate every track at `time` into one frame of skeleton writes.
    pub fn sample_batch(&self, time: f32) -> PoseWriteBatch {
        PoseWriteBatch::from_pose(&self.sample_pose(time))
    }
}

/// Build per-joint rotation tracks, root position tracks and expression tracks
/// from every playable keyframe of `sequence`.
pub fn compile_to_tracks(sequence: &TimelineSequence) -> CompiledTracks {
    let mut out = CompiledTracks::default();
    let mut inert = 0usize;
    for kf in sequence.keyframes() {
        if kf.time > sequence.duration() {
            inert += 1;
            continue;
        }
        let mut joints: Vec<_> = kf.pose.joints().iter().collect();
        joints.sort_by_key(|(j, _)| *j);
        for (joint, q) in joints {
            out.rotations.entry(joint).or_default().push(Sample {
                time: kf.time,
                value: q,
                easing: kf.easing,
            });
        }
        if let Some(root) = kf.pose.root() {
            out.positions
                .entry(SkeletonJoint::ROOT)
                .or_default()
                .push(Sample {
                    time: kf.time,
                    value: root.position,
                    easing: kf.easing,
                });
        }
        if let Some(expressions) = kf.pose.expressions() {
            for (channel, w) in expressions.iter() {
                out.expressions
                    .entry(channel.to_string())
                    .or_default()
                    .push(Sample {
                        time: kf.time,
                        value: w,
                        easing: kf.easing,
                    });
            }
        }
    }
    if inert > 0 {
        debug!("compile: {inert} keyframe(s) beyond duration are inert");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(points: &[(f32, f32, Easing)]) -> Track<f32> {
        let mut t = Track::default();
        for (time, value, easing) in points {
            t.push(Sample {
                time: *time,
                value: *value,
                easing: *easing,
            });
        }
        t
    }

    #[test]
    fn clamps_outside_sample_range() {
        let t = track(&[(1.0, 3.0, Easing::Linear), (2.0, 5.0, Easing::Linear)]);
        assert_eq!(t.sample(0.0), Some(3.0));
        assert_eq!(t.sample(9.0), Some(5.0));
        assert_eq!(t.sample(1.5), Some(4.0));
    }

    #[test]
    fn ties_resolve_to_last_sample_at_that_instant() {
        let t = track(&[
            (0.0, 0.0, Easing::Linear),
            (1.0, 10.0, Easing::Linear),
            (1.0, 20.0, Easing::Linear),
            (2.0, 30.0, Easing::Linear),
        ]);
        assert_eq!(t.sample(1.0), Some(20.0));
        // approaching from the left blends toward the first sample of the tie
        assert_eq!(t.sample(0.5), Some(5.0));
        // leaving from the right starts from the winning sample
        assert_eq!(t.sample(1.5), Some(25.0));
    }

    #[test]
    fn empty_track_has_no_value() {
        let t: Track<f32> = Track::default();
        assert_eq!(t.sample(0.0), None);
    }
}
