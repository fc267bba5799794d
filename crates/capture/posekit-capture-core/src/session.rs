//! Capture session lifecycle: camera ownership, epochs and frame delivery.
//!
//! Every successful `start` opens a new epoch. Frames carry the epoch they were
//! captured in; anything from an older epoch, or delivered while stopped, is
//! discarded so late solver results never touch the rig after `stop`.

use log::{debug, info, warn};
use posekit_api_core::{ApplyReport, SkeletonBinding};

use crate::config::RetargetConfig;
use crate::error::CaptureError;
use crate::retarget::RetargetEngine;
use crate::solver::{LandmarkFrame, PoseSolver};

/// External landmark source (camera + landmark model).
pub trait CameraSource {
    fn open(&mut self) -> Result<(), CaptureError>;
    fn close(&mut self);
}

/// What happened to one delivered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Writes were applied with one commit.
    Applied(ApplyReport),
    /// The solver produced nothing usable; previous values persist.
    Skipped,
    /// The solver failed; the frame was dropped and capture continues.
    Dropped,
    /// The frame belongs to a stopped or superseded session.
    Discarded,
}

pub struct CaptureSession<C: CameraSource, P: PoseSolver> {
    camera: C,
    solver: P,
    engine: RetargetEngine,
    active: bool,
    epoch: u64,
}

impl<C: CameraSource, P: PoseSolver> CaptureSession<C, P> {
    pub fn new(camera: C, solver: P, cfg: RetargetConfig) -> Self {
        Self {
            camera,
            solver,
            engine: RetargetEngine::new(cfg),
            active: false,
            epoch: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Epoch of the current (or most recent) session; 0 before the first start.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn engine(&self) -> &RetargetEngine {
        &self.engine
    }

    pub fn config(&self) -> &RetargetConfig {
        self.engine.config()
    }

    pub fn set_config(&mut self, cfg: RetargetConfig) {
        self.engine.set_config(cfg);
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Open the camera and begin a new epoch. A no-op when already running.
    /// On failure nothing changes and the error is returned to the caller.
    pub fn start(&mut self) -> Result<u64, CaptureError> {
        if self.active {
            return Ok(self.epoch);
        }
        self.camera.open()?;
        self.epoch += 1;
        self.active = true;
        info!("capture started (epoch {})", self.epoch);
        Ok(self.epoch)
    }

    /// Close the camera and drop all retargeting state. A no-op when stopped.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.camera.close();
        self.active = false;
        self.engine.reset();
        info!("capture stopped (epoch {})", self.epoch);
    }

    /// Solve and retarget one frame onto `rig`.
    pub fn deliver(&mut self, frame: &LandmarkFrame, rig: &mut dyn SkeletonBinding) -> FrameOutcome {
        if !self.active || frame.epoch != self.epoch {
            debug!(
                "discarding frame from epoch {} (current {}, active {})",
                frame.epoch, self.epoch, self.active
            );
            return FrameOutcome::Discarded;
        }
        let output = match self.solver.solve(frame) {
            Ok(output) => output,
            Err(err) => {
                warn!("pose solver failed, frame dropped: {err}");
                return FrameOutcome::Dropped;
            }
        };
        match self.engine.retarget(&output, rig) {
            Some(report) => FrameOutcome::Applied(report),
            None => FrameOutcome::Skipped,
        }
    }
}

impl<C: CameraSource, P: PoseSolver> Drop for CaptureSession<C, P> {
    fn drop(&mut self) {
        if self.active {
            self.camera.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::solver::SolverOutput;
    use posekit_api_core::{MemorySkeleton, SkeletonHandle};

    #[derive(Default)]
    struct Cam {
        opens: u32,
        closes: u32,
    }

    impl CameraSource for Cam {
        fn open(&mut self) -> Result<(), CaptureError> {
            self.opens += 1;
            Ok(())
        }
        fn close(&mut self) {
            self.closes += 1;
        }
    }

    fn failing(_: &LandmarkFrame) -> Result<SolverOutput, SolverError> {
        Err(SolverError::Failed("no person".into()))
    }

    #[test]
    fn solver_error_drops_frame_and_keeps_running() {
        let mut session = CaptureSession::new(Cam::default(), failing, RetargetConfig::default());
        let epoch = session.start().unwrap();
        let mut rig = MemorySkeleton::humanoid(SkeletonHandle(1));
        let frame = LandmarkFrame {
            epoch,
            ..Default::default()
        };
        assert_eq!(session.deliver(&frame, &mut rig), FrameOutcome::Dropped);
        assert!(session.is_active());
        assert_eq!(rig.commit_count(), 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut session = CaptureSession::new(Cam::default(), failing, RetargetConfig::default());
        assert_eq!(session.start().unwrap(), 1);
        assert_eq!(session.start().unwrap(), 1);
        assert_eq!(session.camera().opens, 1);
        session.stop();
        session.stop();
        assert_eq!(session.camera().closes, 1);
        assert_eq!(session.start().unwrap(), 2);
    }
}
