//! Pose solver boundary.
//!
//! The external solver turns landmark frames into loosely typed JSON:
//!   { "pose": { "joints": { "LeftUpperArm": {"x","y","z"} | {"x","y","z","w"}, ... },
//!               "rootPosition"?: {"x","y","z"}, "confidence"?: 0.9 },
//!     "face": { "head"?: rotation, "eyes"?: {"left","right"}, "mouth"?: {"aa": 0.2, ...},
//!               "brow"?: 0.1, "confidence"?: 0.8 } }
//!
//! Rotations without `w` are XYZ euler radians. `SolverOutput::from_json` validates
//! this shape once; unknown joint names and non-finite values are logged and
//! dropped there, so downstream code only sees typed, finite values.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use posekit_api_core::rotation::{quat_from_euler, try_normalize_quat};
use posekit_api_core::{Quat, SkeletonJoint, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SolverError;

/// One tracked landmark in normalized image space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

/// Landmarks of one camera frame, tagged with the capture epoch that produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Landmark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Vec<Landmark>>,
}

/// Joint names as the solver emits them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SolverJoint {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
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
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
}

impl SolverJoint {
    pub const ALL: [SolverJoint; 20] = [
        SolverJoint::Hips,
        SolverJoint::Spine,
        SolverJoint::Chest,
        SolverJoint::UpperChest,
        SolverJoint::Neck,
        SolverJoint::Head,
        SolverJoint::LeftShoulder,
        SolverJoint::LeftUpperArm,
        SolverJoint::LeftLowerArm,
        SolverJoint::LeftHand,
        SolverJoint::RightShoulder,
        SolverJoint::RightUpperArm,
        SolverJoint::RightLowerArm,
        SolverJoint::RightHand,
        SolverJoint::LeftUpperLeg,
        SolverJoint::LeftLowerLeg,
        SolverJoint::LeftFoot,
        SolverJoint::RightUpperLeg,
        SolverJoint::RightLowerLeg,
        SolverJoint::RightFoot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hips => "Hips",
            Self::Spine => "Spine",
            Self::Chest => "Chest",
            Self::UpperChest => "UpperChest",
            Self::Neck => "Neck",
            Self::Head => "Head",
            Self::LeftShoulder => "LeftShoulder",
            Self::LeftUpperArm => "LeftUpperArm",
            Self::LeftLowerArm => "LeftLowerArm",
            Self::LeftHand => "LeftHand",
            Self::RightShoulder => "RightShoulder",
            Self::RightUpperArm => "RightUpperArm",
            Self::RightLowerArm => "RightLowerArm",
            Self::RightHand => "RightHand",
            Self::LeftUpperLeg => "LeftUpperLeg",
            Self::LeftLowerLeg => "LeftLowerLeg",
            Self::LeftFoot => "LeftFoot",
            Self::RightUpperLeg => "RightUpperLeg",
            Self::RightLowerLeg => "RightLowerLeg",
            Self::RightFoot => "RightFoot",
        }
    }

    /// Exact, case-sensitive lookup. Anything else is not a solver joint.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.as_str() == name)
    }

    /// Static mapping into the target skeleton.
    pub fn skeleton_joint(&self) -> SkeletonJoint {
        match self {
            Self::Hips => SkeletonJoint::Hips,
            Self::Spine => SkeletonJoint::Spine,
            Self::Chest => SkeletonJoint::Chest,
            Self::UpperChest => SkeletonJoint::UpperChest,
            Self::Neck => SkeletonJoint::Neck,
            Self::Head => SkeletonJoint::Head,
            Self::LeftShoulder => SkeletonJoint::LeftShoulder,
            Self::LeftUpperArm => SkeletonJoint::LeftUpperArm,
            Self::LeftLowerArm => SkeletonJoint::LeftLowerArm,
            Self::LeftHand => SkeletonJoint::LeftHand,
            Self::RightShoulder => SkeletonJoint::RightShoulder,
            Self::RightUpperArm => SkeletonJoint::RightUpperArm,
            Self::RightLowerArm => SkeletonJoint::RightLowerArm,
            Self::RightHand => SkeletonJoint::RightHand,
            Self::LeftUpperLeg => SkeletonJoint::LeftUpperLeg,
            Self::LeftLowerLeg => SkeletonJoint::LeftLowerLeg,
            Self::LeftFoot => SkeletonJoint::LeftFoot,
            Self::RightUpperLeg => SkeletonJoint::RightUpperLeg,
            Self::RightLowerLeg => SkeletonJoint::RightLowerLeg,
            Self::RightFoot => SkeletonJoint::RightFoot,
        }
    }
}

impl fmt::Display for SolverJoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseEstimate {
    pub joints: BTreeMap<SolverJoint, Quat>,
    pub root_position: Option<Vec3>,
    pub confidence: Option<f32>,
}

/// Per-eye openness, 1 = fully open.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EyeOpenness {
    pub left: f32,
    pub right: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceEstimate {
    pub head: Option<Quat>,
    pub eyes: Option<EyeOpenness>,
    /// Viseme → weight
    pub mouth: Option<BTreeMap<String, f32>>,
    pub brow: Option<f32>,
    pub confidence: Option<f32>,
}

/// One solved frame. Either modality may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolverOutput {
    pub pose: Option<PoseEstimate>,
    pub face: Option<FaceEstimate>,
}

impl SolverOutput {
    pub fn is_empty(&self) -> bool {
        self.pose.is_none() && self.face.is_none()
    }

    pub fn from_json_str(s: &str) -> Result<Self, SolverError> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }

    /// Validate raw solver JSON. Only a wrong top-level shape is an error;
    /// bad entries inside a modality are skipped.
    pub fn from_json(value: &Value) -> Result<Self, SolverError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SolverError::Malformed("expected an object".into()))?;
        Ok(Self {
            pose: modality(obj, "pose")?.map(parse_pose),
            face: modality(obj, "face")?.map(parse_face),
        })
    }
}

/// Anything that solves landmark frames into rotations.
pub trait PoseSolver {
    fn solve(&mut self, frame: &LandmarkFrame) -> Result<SolverOutput, SolverError>;
}

impl<F> PoseSolver for F
where
    F: FnMut(&LandmarkFrame) -> Result<SolverOutput, SolverError>,
{
    fn solve(&mut self, frame: &LandmarkFrame) -> Result<SolverOutput, SolverError> {
        self(frame)
    }
}

// ---- json helpers ----

fn modality<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, SolverError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m)),
        Some(_) => Err(SolverError::Malformed(format!("`{key}` must be an object"))),
    }
}

fn number(v: &Value) -> Option<f32> {
    let f = v.as_f64()? as f32;
    f.is_finite().then_some(f)
}

fn vec3(v: &Value) -> Option<Vec3> {
    Some([number(v.get("x")?)?, number(v.get("y")?)?, number(v.get("z")?)?])
}

fn rotation(v: &Value) -> Option<Quat> {
    let [x, y, z] = vec3(v)?;
    match v.get("w") {
        Some(w) => try_normalize_quat([x, y, z, number(w)?]),
        None => Some(quat_from_euler([x, y, z])),
    }
}

fn parse_pose(m: &Map<String, Value>) -> PoseEstimate {
    let mut est = PoseEstimate {
        root_position: m.get("rootPosition").and_then(vec3),
        confidence: m.get("confidence").and_then(number),
        ..Default::default()
    };
    let Some(joints) = m.get("joints").and_then(Value::as_object) else {
        return est;
    };
    for (name, v) in joints {
        let Some(joint) = SolverJoint::from_name(name) else {
            warn!("solver joint `{name}` has no skeleton mapping; skipped");
            continue;
        };
        // hips may come as { rotation, position }
        let (rot, position) = match v.get("rotation") {
            Some(r) => (r, v.get("position")),
            None => (v, None),
        };
        match rotation(rot) {
            Some(q) => {
                est.joints.insert(joint, q);
            }
            None => warn!("solver joint `{name}`: unusable rotation dropped"),
        }
        if joint == SolverJoint::Hips && est.root_position.is_none() {
            est.root_position = position.and_then(vec3);
        }
    }
    est
}

fn parse_face(m: &Map<String, Value>) -> FaceEstimate {
    let head = m.get("head").and_then(|h| {
        let q = rotation(h);
        if q.is_none() {
            warn!("solver face: unusable head rotation dropped");
        }
        q
    });
    let eyes = m.get("eyes").and_then(|e| {
        Some(EyeOpenness {
            left: number(e.get("left")?)?,
            right: number(e.get("right")?)?,
        })
    });
    let mouth = m.get("mouth").and_then(Value::as_object).map(|visemes| {
        visemes
            .iter()
            .filter_map(|(k, v)| number(v).map(|w| (k.clone(), w)))
            .collect()
    });
    FaceEstimate {
        head,
        eyes,
        mouth,
        brow: m.get("brow").and_then(number),
        confidence: m.get("confidence").and_then(number),
    }
}
