//! Retargeting engine: solver output → smoothed writes on the bound skeleton.
//!
//! Per frame:
//! - gate each modality on its reported confidence
//! - map solver joints to skeleton joints (mirroring when configured)
//! - smooth rotations with `slerp(applied, estimate, alpha)`
//! - fuse face values into expression weights
//! - emit one `PoseWriteBatch`, applied with a single commit
//!
//! A modality missing from the frame leaves its applied values untouched.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use log::debug;
use posekit_api_core::rotation::{lerp_vec3, mirror_quat, normalize_quat, slerp_quat};
use posekit_api_core::{
    ApplyReport, PoseWrite, PoseWriteBatch, Quat, SkeletonBinding, SkeletonHandle, SkeletonJoint,
    Vec3,
};

use crate::config::RetargetConfig;
use crate::expressions::fuse_expressions;
use crate::solver::{FaceEstimate, PoseEstimate, SolverOutput};

/// Values last applied to the bound rig.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetargetState {
    rotations: HashMap<SkeletonJoint, Quat>,
    expressions: HashMap<String, f32>,
    root_position: Option<Vec3>,
    bound: Option<SkeletonHandle>,
}

impl RetargetState {
    pub fn rotation(&self, joint: SkeletonJoint) -> Option<Quat> {
        self.rotations.get(&joint).copied()
    }

    pub fn expression(&self, channel: &str) -> Option<f32> {
        self.expressions.get(channel).copied()
    }

    /// Tracked root offset, kept even when it is not applied to the rig.
    pub fn root_position(&self) -> Option<Vec3> {
        self.root_position
    }

    pub fn bound(&self) -> Option<SkeletonHandle> {
        self.bound
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty() && self.expressions.is_empty() && self.root_position.is_none()
    }
}

#[derive(Debug, Default)]
pub struct RetargetEngine {
    cfg: RetargetConfig,
    state: RetargetState,
}

impl RetargetEngine {
    pub fn new(cfg: RetargetConfig) -> Self {
        Self {
            cfg,
            state: RetargetState::default(),
        }
    }

    pub fn config(&self) -> &RetargetConfig {
        &self.cfg
    }

    pub fn set_config(&mut self, cfg: RetargetConfig) {
        self.cfg = cfg;
    }

    pub fn state(&self) -> &RetargetState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = RetargetState::default();
    }

    /// Compute and apply one frame. Returns `None` when the frame produced no writes
    /// (no usable modality), in which case the rig is not committed.
    pub fn retarget(
        &mut self,
        output: &SolverOutput,
        rig: &mut dyn SkeletonBinding,
    ) -> Option<ApplyReport> {
        let batch = self.plan(output, &*rig);
        if batch.is_empty() {
            return None;
        }
        Some(batch.apply(rig))
    }

    /// Advance the smoothing state and return the frame's writes without applying them.
    pub fn plan(&mut self, output: &SolverOutput, rig: &dyn SkeletonBinding) -> PoseWriteBatch {
        let handle = rig.handle();
        if self.state.bound != Some(handle) {
            if self.state.bound.is_some() {
                debug!("skeleton rebound to {:?}; retarget state reset", handle);
            }
            self.reset();
            self.state.bound = Some(handle);
        }

        let pose = output.pose.as_ref().filter(|p| {
            gate("body", p.confidence, self.cfg.min_body_confidence)
        });
        let face = output.face.as_ref().filter(|f| {
            gate("face", f.confidence, self.cfg.min_face_confidence)
        });

        let mut batch = PoseWriteBatch::new();

        // joint → (estimate, alpha); face head overrides a body head estimate
        let mut targets: BTreeMap<SkeletonJoint, (Quat, f32)> = BTreeMap::new();
        if let Some(pose) = pose {
            self.collect_body(pose, &mut targets);
        }
        if let Some(head) = face.and_then(|f| f.head) {
            let q = if self.cfg.mirror { mirror_quat(head) } else { head };
            targets.insert(SkeletonJoint::Head, (q, self.cfg.head_alpha));
        }
        for (joint, (estimate, alpha)) in targets {
            let Some(node) = rig.joint_node(joint) else {
                debug!("rig has no {joint}; skipped");
                continue;
            };
            let prev = self
                .state
                .rotations
                .get(&joint)
                .copied()
                .unwrap_or_else(|| normalize_quat(node.rotation));
            let next = slerp_quat(prev, estimate, alpha);
            self.state.rotations.insert(joint, next);
            batch.push(PoseWrite::Rotation { joint, value: next });
        }

        if let Some(root) = pose.and_then(|p| p.root_position) {
            self.track_root(root, rig, &mut batch);
        }
        if let Some(face) = face {
            self.collect_expressions(face, &mut batch);
        }
        batch
    }

    fn collect_body(&self, pose: &PoseEstimate, targets: &mut BTreeMap<SkeletonJoint, (Quat, f32)>) {
        for (solver_joint, q) in &pose.joints {
            let mut joint = solver_joint.skeleton_joint();
            let mut q = *q;
            if self.cfg.mirror {
                joint = joint.mirrored();
                q = mirror_quat(q);
            }
            let alpha = if joint == SkeletonJoint::Head {
                self.cfg.head_alpha
            } else {
                self.cfg.body_alpha
            };
            targets.insert(joint, (q, alpha));
        }
    }

    fn track_root(&mut self, raw: Vec3, rig: &dyn SkeletonBinding, batch: &mut PoseWriteBatch) {
        let s = self.cfg.root_position_scale;
        let mut p = [raw[0] * s, raw[1] * s, raw[2] * s];
        if self.cfg.mirror {
            p[0] = -p[0];
        }
        if !p.iter().all(|c| c.is_finite()) {
            return;
        }
        let root_node = rig.joint_node(SkeletonJoint::ROOT);
        let prev = self
            .state
            .root_position
            .or_else(|| root_node.map(|n| n.position))
            .unwrap_or(p);
        let next = lerp_vec3(prev, p, self.cfg.body_alpha);
        self.state.root_position = Some(next);

        if self.cfg.apply_root_position && root_node.is_some() {
            batch.push(PoseWrite::Position {
                joint: SkeletonJoint::ROOT,
                value: next,
            });
        }
    }

    fn collect_expressions(&mut self, face: &FaceEstimate, batch: &mut PoseWriteBatch) {
        for (channel, weight) in fuse_expressions(face, self.cfg.blink_threshold, self.cfg.mirror) {
            self.state.expressions.insert(channel.clone(), weight);
            batch.push(PoseWrite::Expression {
                channel,
                value: weight,
            });
        }
    }
}

fn gate(modality: &str, confidence: Option<f32>, min: f32) -> bool {
    match confidence {
        Some(c) if c < min => {
            debug!("{modality} estimate below confidence ({c} < {min}); ignored");
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posekit_api_core::rotation::quat_from_euler;
    use posekit_api_core::{MemorySkeleton, IDENTITY_QUAT};

    use crate::solver::SolverJoint;

    fn body(joint: SolverJoint, q: Quat) -> SolverOutput {
        SolverOutput {
            pose: Some(PoseEstimate {
                joints: [(joint, q)].into(),
                ..Default::default()
            }),
            face: None,
        }
    }

    #[test]
    fn rebinding_resets_state() {
        let mut engine = RetargetEngine::default();
        let mut rig = MemorySkeleton::humanoid(SkeletonHandle(1));
        let q = quat_from_euler([0.0, 0.0, 0.8]);
        engine.retarget(&body(SolverJoint::Spine, q), &mut rig);
        assert!(engine.state().rotation(SkeletonJoint::Spine).is_some());

        rig.rebind(SkeletonHandle(2));
        assert_eq!(rig.committed_rotation(SkeletonJoint::Spine), Some(IDENTITY_QUAT));
        engine.retarget(&body(SolverJoint::Neck, q), &mut rig);
        assert_eq!(engine.state().bound(), Some(SkeletonHandle(2)));
        assert_eq!(engine.state().rotation(SkeletonJoint::Spine), None);
        assert!(engine.state().rotation(SkeletonJoint::Neck).is_some());
    }

    #[test]
    fn smoother_seeds_from_rig_rotation() {
        let mut engine = RetargetEngine::default();
        let mut rig = MemorySkeleton::humanoid(SkeletonHandle(1));
        let start = quat_from_euler([0.4, 0.0, 0.0]);
        rig.write_rotation(SkeletonJoint::Chest, start);
        rig.commit();

        let q = quat_from_euler([0.0, 0.6, 0.0]);
        engine.retarget(&body(SolverJoint::Chest, q), &mut rig);
        let rig_start = normalize_quat(start);
        assert_eq!(
            engine.state().rotation(SkeletonJoint::Chest),
            Some(slerp_quat(rig_start, q, 0.3))
        );
    }

    #[test]
    fn low_confidence_modality_is_ignored() {
        let mut engine = RetargetEngine::default();
        let mut rig = MemorySkeleton::humanoid(SkeletonHandle(1));
        let mut out = body(SolverJoint::Spine, quat_from_euler([0.3, 0.0, 0.0]));
        if let Some(p) = out.pose.as_mut() {
            p.confidence = Some(0.2);
        }
        assert_eq!(engine.retarget(&out, &mut rig), None);
        assert_eq!(rig.commit_count(), 0);
        assert_eq!(rig.committed_rotation(SkeletonJoint::Spine), Some(IDENTITY_QUAT));
    }
}
