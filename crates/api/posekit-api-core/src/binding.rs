//! Skeleton binding contract.
//!
//! Hosts (scene graphs, renderers, tests) implement `SkeletonBinding` for the
//! live avatar rig. Engines never write the rig directly; they produce a
//! `PoseWriteBatch` which stages every write and then commits once.

use serde::{Deserialize, Serialize};

use crate::expression::ALL_CHANNELS;
use crate::joint::SkeletonJoint;
use crate::pose::Pose;
use crate::rotation::{Quat, Vec3, IDENTITY_QUAT};

/// Opaque identity of a bound rig. A different handle means a different skeleton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkeletonHandle(pub u64);

/// Local transform of one joint node as seen by the core.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointNode {
    pub rotation: Quat,
    pub position: Vec3,
}

impl Default for JointNode {
    fn default() -> Self {
        Self {
            rotation: IDENTITY_QUAT,
            position: [0.0; 3],
        }
    }
}

pub trait SkeletonBinding {
    fn handle(&self) -> SkeletonHandle;

    /// Current local transform of `joint`, or `None` when the rig has no such node.
    fn joint_node(&self, joint: SkeletonJoint) -> Option<JointNode>;

    /// Current weight of an expression channel, `None` when the rig lacks it.
    fn expression_weight(&self, _channel: &str) -> Option<f32> {
        None
    }

    /// Stage a rotation write. Returns false when the joint does not exist.
    fn write_rotation(&mut self, joint: SkeletonJoint, rotation: Quat) -> bool;

    /// Stage a position write. Returns false when the joint does not exist.
    fn write_position(&mut self, joint: SkeletonJoint, position: Vec3) -> bool;

    /// Stage an expression write. Unknown channels are ignored and return false.
    fn write_expression(&mut self, channel: &str, weight: f32) -> bool;

    /// Make staged writes visible to downstream consumers.
    fn commit(&mut self);
}

/// Read the rig back into a `Pose` (the "capture pose" action).
/// Root position is captured only when it is non-zero.
pub fn snapshot_pose(rig: &dyn SkeletonBinding) -> Pose {
    let mut pose = Pose::new();
    for joint in SkeletonJoint::ALL {
        if let Some(node) = rig.joint_node(joint) {
            pose = pose.with_joint(joint, node.rotation);
            if joint.is_root() && node.position != [0.0; 3] {
                pose = pose.with_root(node.position);
            }
        }
    }
    for channel in ALL_CHANNELS {
        if let Some(w) = rig.expression_weight(channel) {
            pose = pose.with_expression(channel, w);
        }
    }
    pose
}
