//! posekit capture core
//!
//! Live motion-capture retargeting: validates pose solver output at the
//! boundary, maps solver joints onto the humanoid skeleton, smooths rotations,
//! fuses face values into expression weights and applies each frame to a
//! `SkeletonBinding` with one commit. `CaptureSession` owns the camera and
//! discards results that arrive after the session that produced them ended.

pub mod config;
pub mod error;
pub mod expressions;
pub mod retarget;
pub mod session;
pub mod solver;

pub use config::RetargetConfig;
pub use error::{CaptureError, SolverError};
pub use expressions::fuse_expressions;
pub use retarget::{RetargetEngine, RetargetState};
pub use session::{CameraSource, CaptureSession, FrameOutcome};
pub use solver::{
    EyeOpenness, FaceEstimate, Landmark, LandmarkFrame, PoseEstimate, PoseSolver, SolverJoint,
    SolverOutput,
};
