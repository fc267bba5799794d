//! Canonical pose representation.
//!
//! A `Pose` is a value: builder methods return a new pose and never mutate in
//! place. Joint rotations are always unit quaternions and expression weights
//! always lie in [0, 1]; both invariants are re-established on deserialize.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::expression::clamp_weight;
use crate::joint::SkeletonJoint;
use crate::rotation::{try_normalize_quat, Quat, Vec3};

/// Joint → local rotation. Joints without an entry are unmapped, not identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<SkeletonJoint, Quat>",
    into = "HashMap<SkeletonJoint, Quat>"
)]
pub struct JointRotations(HashMap<SkeletonJoint, Quat>);

impl JointRotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rotation, normalizing it. Degenerate quaternions are rejected.
    pub fn insert(&mut self, joint: SkeletonJoint, rotation: Quat) -> bool {
        match try_normalize_quat(rotation) {
            Some(q) => {
                self.0.insert(joint, q);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, joint: SkeletonJoint) -> Option<Quat> {
        self.0.get(&joint).copied()
    }

    pub fn contains(&self, joint: SkeletonJoint) -> bool {
        self.0.contains_key(&joint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkeletonJoint, Quat)> + '_ {
        self.0.iter().map(|(j, q)| (*j, *q))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<SkeletonJoint, Quat>> for JointRotations {
    fn from(raw: HashMap<SkeletonJoint, Quat>) -> Self {
        let mut out = JointRotations::new();
        for (joint, q) in raw {
            out.insert(joint, q);
        }
        out
    }
}

impl From<JointRotations> for HashMap<SkeletonJoint, Quat> {
    fn from(value: JointRotations) -> Self {
        value.0
    }
}

/// Position offset of the root joint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RootTransform {
    pub position: Vec3,
}

impl RootTransform {
    pub fn new(position: Vec3) -> Option<Self> {
        if position.iter().all(|c| c.is_finite()) {
            Some(Self { position })
        } else {
            None
        }
    }
}

/// Expression channel → weight in [0, 1].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, f32>", into = "HashMap<String, f32>")]
pub struct ExpressionWeights(HashMap<String, f32>);

impl ExpressionWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a channel weight (clamped). Non-finite weights are rejected.
    pub fn set(&mut self, channel: impl Into<String>, weight: f32) -> bool {
        match clamp_weight(weight) {
            Some(w) => {
                self.0.insert(channel.into(), w);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, channel: &str) -> Option<f32> {
        self.0.get(channel).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, f32>> for ExpressionWeights {
    fn from(raw: HashMap<String, f32>) -> Self {
        let mut out = ExpressionWeights::new();
        for (channel, w) in raw {
            out.set(channel, w);
        }
        out
    }
}

impl From<ExpressionWeights> for HashMap<String, f32> {
    fn from(value: ExpressionWeights) -> Self {
        value.0
    }
}

/// Full snapshot of joint rotations, optional root position and expression weights.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    joints: JointRotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<RootTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expressions: Option<ExpressionWeights>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// New pose with `joint` set to `rotation` (normalized). Degenerate rotations leave the pose unchanged.
    pub fn with_joint(mut self, joint: SkeletonJoint, rotation: Quat) -> Self {
        self.joints.insert(joint, rotation);
        self
    }

    /// New pose with the root offset set. Non-finite positions leave the pose unchanged.
    pub fn with_root(mut self, position: Vec3) -> Self {
        if let Some(root) = RootTransform::new(position) {
            self.root = Some(root);
        }
        self
    }

    pub fn with_expression(mut self, channel: impl Into<String>, weight: f32) -> Self {
        let mut weights = self.expressions.take().unwrap_or_default();
        weights.set(channel, weight);
        self.expressions = Some(weights).filter(|e| !e.is_empty());
        self
    }

    #[inline]
    pub fn joints(&self) -> &JointRotations {
        &self.joints
    }

    #[inline]
    pub fn rotation(&self, joint: SkeletonJoint) -> Option<Quat> {
        self.joints.get(joint)
    }

    #[inline]
    pub fn root(&self) -> Option<RootTransform> {
        self.root
    }

    #[inline]
    pub fn expressions(&self) -> Option<&ExpressionWeights> {
        self.expressions.as_ref()
    }

    pub fn expression(&self, channel: &str) -> Option<f32> {
        self.expressions.as_ref().and_then(|e| e.get(channel))
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.root.is_none() && self.expressions.is_none()
    }
}
