//! Humanoid joint set shared by the pose model, the timeline and retargeting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named joint of the target humanoid skeleton (lower camel case on the wire).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkeletonJoint {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    Jaw,
    LeftEye,
    RightEye,
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    LeftToes,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    RightToes,
}

impl SkeletonJoint {
    pub const ALL: [SkeletonJoint; 25] = [
        SkeletonJoint::Hips,
        SkeletonJoint::Spine,
        SkeletonJoint::Chest,
        SkeletonJoint::UpperChest,
        SkeletonJoint::Neck,
        SkeletonJoint::Head,
        SkeletonJoint::Jaw,
        SkeletonJoint::LeftEye,
        SkeletonJoint::RightEye,
        SkeletonJoint::LeftShoulder,
        SkeletonJoint::LeftUpperArm,
        SkeletonJoint::LeftLowerArm,
        SkeletonJoint::LeftHand,
        SkeletonJoint::RightShoulder,
        SkeletonJoint::RightUpperArm,
        SkeletonJoint::RightLowerArm,
        SkeletonJoint::RightHand,
        SkeletonJoint::LeftUpperLeg,
        SkeletonJoint::LeftLowerLeg,
        SkeletonJoint::LeftFoot,
        SkeletonJoint::LeftToes,
        SkeletonJoint::RightUpperLeg,
        SkeletonJoint::RightLowerLeg,
        SkeletonJoint::RightFoot,
        SkeletonJoint::RightToes,
    ];

    /// The root joint; the only joint that may carry a position.
    pub const ROOT: SkeletonJoint = SkeletonJoint::Hips;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hips => "hips",
            Self::Spine => "spine",
            Self::Chest => "chest",
            Self::UpperChest => "upperChest",
            Self::Neck => "neck",
            Self::Head => "head",
            Self::Jaw => "jaw",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftShoulder => "leftShoulder",
            Self::LeftUpperArm => "leftUpperArm",
            Self::LeftLowerArm => "leftLowerArm",
            Self::LeftHand => "leftHand",
            Self::RightShoulder => "rightShoulder",
            Self::RightUpperArm => "rightUpperArm",
            Self::RightLowerArm => "rightLowerArm",
            Self::RightHand => "rightHand",
            Self::LeftUpperLeg => "leftUpperLeg",
            Self::LeftLowerLeg => "leftLowerLeg",
            Self::LeftFoot => "leftFoot",
            Self::LeftToes => "leftToes",
            Self::RightUpperLeg => "rightUpperLeg",
            Self::RightLowerLeg => "rightLowerLeg",
            Self::RightFoot => "rightFoot",
            Self::RightToes => "rightToes",
        }
    }

    /// Exact-name lookup; no case folding.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.as_str() == name)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    /// Counterpart on the opposite side of the body (center joints map to themselves).
    pub fn mirrored(&self) -> Self {
        match self {
            Self::LeftEye => Self::RightEye,
            Self::RightEye => Self::LeftEye,
            Self::LeftShoulder => Self::RightShoulder,
            Self::RightShoulder => Self::LeftShoulder,
            Self::LeftUpperArm => Self::RightUpperArm,
            Self::RightUpperArm => Self::LeftUpperArm,
            Self::LeftLowerArm => Self::RightLowerArm,
            Self::RightLowerArm => Self::LeftLowerArm,
            Self::LeftHand => Self::RightHand,
            Self::RightHand => Self::LeftHand,
            Self::LeftUpperLeg => Self::RightUpperLeg,
            Self::RightUpperLeg => Self::LeftUpperLeg,
            Self::LeftLowerLeg => Self::RightLowerLeg,
            Self::RightLowerLeg => Self::LeftLowerLeg,
            Self::LeftFoot => Self::RightFoot,
            Self::RightFoot => Self::LeftFoot,
            Self::LeftToes => Self::RightToes,
            Self::RightToes => Self::LeftToes,
            other => *other,
        }
    }
}

impl fmt::Display for SkeletonJoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
