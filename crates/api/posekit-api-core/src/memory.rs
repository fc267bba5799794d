//! In-memory skeleton binding.
//!
//! Keeps a staged and a committed copy of the rig; readers of the committed
//! state never observe a partially applied frame. Hosts without a scene graph
//! (headless export, tests) bind to this directly.

use std::collections::BTreeMap;

use crate::binding::{JointNode, SkeletonBinding, SkeletonHandle};
use crate::expression::{clamp_weight, ALL_CHANNELS};
use crate::joint::SkeletonJoint;
use crate::rotation::{normalize_quat, Quat, Vec3};

#[derive(Clone, Debug, Default, PartialEq)]
struct RigState {
    joints: BTreeMap<SkeletonJoint, JointNode>,
    expressions: BTreeMap<String, f32>,
}

#[derive(Clone, Debug)]
pub struct MemorySkeleton {
    handle: SkeletonHandle,
    staged: RigState,
    committed: RigState,
    pending: usize,
    commits: u64,
}

impl MemorySkeleton {
    /// Full humanoid rig at rest with every well-known expression channel at 0.
    pub fn humanoid(handle: SkeletonHandle) -> Self {
        Self::with_joints(handle, &SkeletonJoint::ALL, &ALL_CHANNELS)
    }

    /// Rig exposing only the listed joints and channels.
    pub fn with_joints(handle: SkeletonHandle, joints: &[SkeletonJoint], channels: &[&str]) -> Self {
        let mut state = RigState::default();
        for joint in joints {
            state.joints.insert(*joint, JointNode::default());
        }
        for channel in channels {
            state.expressions.insert((*channel).to_string(), 0.0);
        }
        Self {
            handle,
            staged: state.clone(),
            committed: state,
            pending: 0,
            commits: 0,
        }
    }

    pub fn committed_rotation(&self, joint: SkeletonJoint) -> Option<Quat> {
        self.committed.joints.get(&joint).map(|n| n.rotation)
    }

    pub fn committed_position(&self, joint: SkeletonJoint) -> Option<Vec3> {
        self.committed.joints.get(&joint).map(|n| n.position)
    }

    pub fn committed_expression(&self, channel: &str) -> Option<f32> {
        self.committed.expressions.get(channel).copied()
    }

    /// Rotation written since the last commit, not yet visible to readers.
    pub fn staged_rotation(&self, joint: SkeletonJoint) -> Option<Quat> {
        self.staged.joints.get(&joint).map(|n| n.rotation)
    }

    /// Writes staged since the last commit.
    pub fn pending_writes(&self) -> usize {
        self.pending
    }

    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Rebind to a different rig identity, resetting to rest.
    pub fn rebind(&mut self, handle: SkeletonHandle) {
        let joints: Vec<_> = self.committed.joints.keys().copied().collect();
        let channels: Vec<String> = self.committed.expressions.keys().cloned().collect();
        let refs: Vec<&str> = channels.iter().map(|s| s.as_str()).collect();
        *self = Self::with_joints(handle, &joints, &refs);
    }
}

impl SkeletonBinding for MemorySkeleton {
    fn handle(&self) -> SkeletonHandle {
        self.handle
    }

    fn joint_node(&self, joint: SkeletonJoint) -> Option<JointNode> {
        self.committed.joints.get(&joint).copied()
    }

    fn expression_weight(&self, channel: &str) -> Option<f32> {
        self.committed.expressions.get(channel).copied()
    }

    fn write_rotation(&mut self, joint: SkeletonJoint, rotation: Quat) -> bool {
        match self.staged.joints.get_mut(&joint) {
            Some(node) => {
                node.rotation = normalize_quat(rotation);
                self.pending += 1;
                true
            }
            None => false,
        }
    }

    fn write_position(&mut self, joint: SkeletonJoint, position: Vec3) -> bool {
        if !position.iter().all(|c| c.is_finite()) {
            return false;
        }
        match self.staged.joints.get_mut(&joint) {
            Some(node) => {
                node.position = position;
                self.pending += 1;
                true
            }
            None => false,
        }
    }

    fn write_expression(&mut self, channel: &str, weight: f32) -> bool {
        let Some(w) = clamp_weight(weight) else {
            return false;
        };
        match self.staged.expressions.get_mut(channel) {
            Some(slot) => {
                *slot = w;
                self.pending += 1;
                true
            }
            None => false,
        }
    }

    fn commit(&mut self) {
        self.committed = self.staged.clone();
        self.pending = 0;
        self.commits += 1;
    }
}
