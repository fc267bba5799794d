use anyhow::{Context, Result};
use log::debug;

use posekit_api_core::{snapshot_pose, ApplyReport, Pose, PoseWriteBatch, SkeletonBinding};
use posekit_capture::{CameraSource, CaptureSession, FrameOutcome, LandmarkFrame, PoseSolver};
use posekit_timeline::{
    bake_sequence, parse_sequence_json, sequence_to_json, BakedSequence, BakingConfig, KeyframeId,
    TimelineEngine, TimelineOutputs,
};

use crate::{DriveMode, StudioConfig};

/// One avatar session: a timeline, a capture session and the drive-mode policy
/// that keeps them from writing the rig on the same frame.
pub struct PoseStudio<C: CameraSource, P: PoseSolver> {
    timeline: TimelineEngine,
    capture: CaptureSession<C, P>,
    mode: DriveMode,
}

impl<C: CameraSource, P: PoseSolver> PoseStudio<C, P> {
    pub fn new(camera: C, solver: P, cfg: StudioConfig) -> Self {
        Self {
            timeline: TimelineEngine::new(cfg.timeline),
            capture: CaptureSession::new(camera, solver, cfg.retarget),
            mode: DriveMode::Manual,
        }
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    pub fn timeline(&self) -> &TimelineEngine {
        &self.timeline
    }

    /// Editing access (keyframe CRUD, duration, looping). Playback transitions
    /// should go through `play_timeline` / `stop_timeline` so the mode follows.
    pub fn timeline_mut(&mut self) -> &mut TimelineEngine {
        &mut self.timeline
    }

    pub fn capture(&self) -> &CaptureSession<C, P> {
        &self.capture
    }

    // ---- drive mode transitions ----

    /// Open the camera and hand the rig to the retargeter. Timeline playback stops.
    pub fn start_capture(&mut self) -> Result<()> {
        let epoch = self
            .capture
            .start()
            .context("failed to start camera capture")?;
        self.timeline.stop();
        self.mode = DriveMode::Capture;
        debug!("drive mode: capture (epoch {epoch})");
        Ok(())
    }

    pub fn stop_capture(&mut self) {
        self.capture.stop();
        if self.mode == DriveMode::Capture {
            self.mode = DriveMode::Manual;
        }
    }

    /// Stop capture and start playback from the current playhead.
    pub fn play_timeline(&mut self) {
        self.capture.stop();
        self.timeline.play();
        self.mode = DriveMode::Timeline;
    }

    pub fn stop_timeline(&mut self) {
        self.timeline.stop();
        if self.mode == DriveMode::Timeline {
            self.mode = DriveMode::Manual;
        }
    }

    // ---- per-frame entry points ----

    /// Forward a landmark frame to the capture session. Ignored outside capture mode.
    pub fn on_camera_frame(
        &mut self,
        frame: &LandmarkFrame,
        rig: &mut dyn SkeletonBinding,
    ) -> FrameOutcome {
        if self.mode != DriveMode::Capture {
            return FrameOutcome::Discarded;
        }
        self.capture.deliver(frame, rig)
    }

    /// Advance playback and apply the frame. Only timeline mode writes the rig.
    /// When playback stops (end reached) the studio falls back to manual mode.
    pub fn on_render_tick(&mut self, dt: f32, rig: &mut dyn SkeletonBinding) -> TimelineOutputs {
        if self.mode != DriveMode::Timeline {
            return TimelineOutputs::default();
        }
        let out = self.timeline.tick(dt);
        if !out.batch.is_empty() {
            out.batch.apply(rig);
        }
        if !self.timeline.is_playing() {
            debug!("timeline stopped at {}; drive mode: manual", self.timeline.current_time());
            self.mode = DriveMode::Manual;
        }
        out
    }

    /// Move the playhead and show the sampled pose once. While capture owns the
    /// rig only the playhead moves.
    pub fn scrub(&mut self, time: f32, rig: &mut dyn SkeletonBinding) -> f32 {
        let t = self.timeline.set_current_time(time);
        if self.mode != DriveMode::Capture && !self.timeline.tracks().is_empty() {
            self.timeline.current_batch().apply(rig);
        }
        t
    }

    /// Apply a hand-authored pose. Refused while an engine drives the rig.
    pub fn apply_manual_pose(
        &mut self,
        pose: &Pose,
        rig: &mut dyn SkeletonBinding,
    ) -> Option<ApplyReport> {
        if self.mode != DriveMode::Manual {
            debug!("manual pose ignored in {:?} mode", self.mode);
            return None;
        }
        Some(PoseWriteBatch::from_pose(pose).apply(rig))
    }

    // ---- timeline authoring and persistence ----

    /// Snapshot the rig into a new keyframe, at `time` or the playhead.
    pub fn capture_keyframe(
        &mut self,
        rig: &dyn SkeletonBinding,
        time: Option<f32>,
        label: Option<String>,
    ) -> KeyframeId {
        let pose = snapshot_pose(rig);
        let t = time.unwrap_or_else(|| self.timeline.current_time());
        self.timeline.add_keyframe(pose, t, label, None)
    }

    pub fn export_timeline_json(&self) -> Result<String> {
        sequence_to_json(self.timeline.sequence()).context("failed to serialize timeline")
    }

    /// Replace the sequence with one loaded from JSON. Playback stops.
    pub fn import_timeline_json(&mut self, json: &str) -> Result<()> {
        let sequence = parse_sequence_json(json).context("failed to load timeline")?;
        self.timeline.replace_sequence(sequence);
        if self.mode == DriveMode::Timeline {
            self.mode = DriveMode::Manual;
        }
        Ok(())
    }

    /// Sample the timeline at a fixed rate for frame-by-frame exporters.
    pub fn bake_timeline(&self, cfg: &BakingConfig) -> BakedSequence {
        bake_sequence(self.timeline.sequence(), cfg)
    }
}
