//! Baking API: sample a sequence at a fixed frame rate over a time window.
//! Used by frame-by-frame exporters that cannot drive the playback clock.

use log::warn;
use posekit_api_core::Pose;
use serde::{Deserialize, Serialize};

use crate::data::TimelineSequence;
use crate::tracks::compile_to_tracks;

/// Upper bound on frames produced by one bake. Longer windows are truncated
/// so the last frame lands at `start + (MAX_BAKED_FRAMES - 1) / frame_rate`.
pub const MAX_BAKED_FRAMES: usize = 1 << 18;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
    /// Start time (seconds).
    pub start_time: f32,
    /// End time (seconds); if None, uses the sequence duration.
    pub end_time: Option<f32>,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            start_time: 0.0,
            end_time: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedFrame {
    pub time: f32,
    pub pose: Pose,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BakedSequence {
    pub frame_rate: f32,
    pub start_time: f32,
    pub end_time: f32,
    pub frames: Vec<BakedFrame>,
}

/// Bake `sequence` using `cfg`. The window is clamped into [0, duration] and the
/// last frame lands exactly on the window end.
pub fn bake_sequence(sequence: &TimelineSequence, cfg: &BakingConfig) -> BakedSequence {
    let fr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        30.0
    };
    let fr = fr.max(1.0);
    let duration = sequence.duration();
    let start = if cfg.start_time.is_finite() {
        cfg.start_time.clamp(0.0, duration)
    } else {
        0.0
    };
    let mut end = cfg
        .end_time
        .filter(|e| e.is_finite())
        .unwrap_or(duration)
        .clamp(start, duration);
    let steps = ((end - start) as f64 * fr as f64).ceil();
    let max_steps = MAX_BAKED_FRAMES - 1;
    let frame_count = if steps > max_steps as f64 {
        let capped_end = start + max_steps as f32 / fr;
        warn!(
            "bake window {start}..{end}s at {fr}Hz exceeds {MAX_BAKED_FRAMES} frames; truncating at {capped_end}s"
        );
        end = capped_end.min(end);
        MAX_BAKED_FRAMES
    } else {
        steps as usize + 1 // inclusive of end
    };

    let tracks = compile_to_tracks(sequence);
    let frames = (0..frame_count)
        .map(|f| {
            let time = (start + f as f32 / fr).min(end);
            BakedFrame {
                time,
                pose: tracks.sample_pose(time),
            }
        })
        .collect();

    BakedSequence {
        frame_rate: fr,
        start_time: start,
        end_time: end,
        frames,
    }
}

/// Export baked data as serde_json::Value (stable schema for exporters).
pub fn export_baked_json(baked: &BakedSequence) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}
