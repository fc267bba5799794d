//! Write operations produced by engines (retargeting, timeline) to describe
//! one frame of writes into a bound skeleton.
//!
//! PoseWrite serializes to JSON as:
//!   { "kind": "rotation", "joint": "leftUpperArm", "value": [x, y, z, w] }
//!
//! PoseWriteBatch is a simple Vec<PoseWrite> applied with a single commit.

use serde::{Deserialize, Serialize};

use crate::binding::SkeletonBinding;
use crate::joint::SkeletonJoint;
use crate::pose::Pose;
use crate::rotation::{Quat, Vec3};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PoseWrite {
    Rotation { joint: SkeletonJoint, value: Quat },
    Position { joint: SkeletonJoint, value: Vec3 },
    Expression { channel: String, value: f32 },
}

/// Result of applying a batch to a rig.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Writes the rig accepted.
    pub applied: usize,
    /// Writes targeting joints or channels the rig does not have.
    pub missed: usize,
}

/// A batch of writes. Engines emit one PoseWriteBatch per frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWriteBatch(pub Vec<PoseWrite>);

impl PoseWriteBatch {
    pub fn new() -> Self {
        PoseWriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: PoseWrite) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = PoseWrite>) {
        self.0.extend(other);
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseWrite> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Writes that set every joint, root offset and expression channel of `pose`.
    pub fn from_pose(pose: &Pose) -> Self {
        let mut batch = PoseWriteBatch::new();
        let mut joints: Vec<_> = pose.joints().iter().collect();
        joints.sort_by_key(|(j, _)| *j);
        for (joint, value) in joints {
            batch.push(PoseWrite::Rotation { joint, value });
        }
        if let Some(root) = pose.root() {
            batch.push(PoseWrite::Position {
                joint: SkeletonJoint::ROOT,
                value: root.position,
            });
        }
        if let Some(expressions) = pose.expressions() {
            let mut channels: Vec<_> = expressions.iter().collect();
            channels.sort_by(|a, b| a.0.cmp(b.0));
            for (channel, value) in channels {
                batch.push(PoseWrite::Expression {
                    channel: channel.to_string(),
                    value,
                });
            }
        }
        batch
    }

    /// Stage every write on `rig`, then commit once. An empty batch still commits
    /// so consumers observe a consistent frame boundary.
    pub fn apply(&self, rig: &mut dyn SkeletonBinding) -> ApplyReport {
        let mut report = ApplyReport::default();
        for op in &self.0 {
            let hit = match op {
                PoseWrite::Rotation { joint, value } => rig.write_rotation(*joint, *value),
                PoseWrite::Position { joint, value } => rig.write_position(*joint, *value),
                PoseWrite::Expression { channel, value } => rig.write_expression(channel, *value),
            };
            if hit {
                report.applied += 1;
            } else {
                report.missed += 1;
            }
        }
        rig.commit();
        report
    }
}

impl IntoIterator for PoseWriteBatch {
    type Item = PoseWrite;
    type IntoIter = std::vec::IntoIter<PoseWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
