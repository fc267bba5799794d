//! posekit-api-core: canonical pose model and skeleton binding (core, engine-agnostic)

pub mod binding;
pub mod expression;
pub mod joint;
pub mod memory;
pub mod pose;
pub mod rotation;
pub mod write_ops;

pub use binding::{snapshot_pose, JointNode, SkeletonBinding, SkeletonHandle};
pub use joint::SkeletonJoint;
pub use memory::MemorySkeleton;
pub use pose::{ExpressionWeights, JointRotations, Pose, RootTransform};
pub use rotation::{Quat, Vec3, IDENTITY_QUAT};
pub use write_ops::{ApplyReport, PoseWrite, PoseWriteBatch};
