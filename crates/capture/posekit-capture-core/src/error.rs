//! Error types for capture sessions and the pose solver boundary

use thiserror::Error;

/// Resource acquisition failures. Returned from `CaptureSession::start`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    /// No camera could be opened
    #[error("camera unavailable: {reason}")]
    CameraUnavailable { reason: String },

    /// The user or platform refused camera access
    #[error("camera permission denied")]
    PermissionDenied,
}

/// Per-frame solver failures. Absorbed by the session (logged, frame dropped).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SolverError {
    #[error("solver failed: {0}")]
    Failed(String),

    #[error("solver output is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed solver output: {0}")]
    Malformed(String),
}
