//! posekit-orchestrator
//!
//! Session context for the posing tool. `PoseStudio` owns exactly one timeline
//! engine and one capture session and decides which of them drives the avatar
//! on a given frame. The engines themselves know nothing about each other.

pub mod studio;

use serde::{Deserialize, Serialize};

use posekit_capture::RetargetConfig;
use posekit_timeline::TimelineConfig;

pub use crate::studio::PoseStudio;

/// Which source currently owns writes to the rig.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriveMode {
    /// Hand posing; no engine writes.
    #[default]
    Manual,
    /// Live camera retargeting.
    Capture,
    /// Timeline playback.
    Timeline,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub timeline: TimelineConfig,
    pub retarget: RetargetConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_config_from_partial_json() {
        let cfg: StudioConfig =
            serde_json::from_str(r#"{ "retarget": { "mirror": true }, "timeline": { "looping": true } }"#)
                .unwrap();
        assert!(cfg.retarget.mirror);
        assert_eq!(cfg.retarget.body_alpha, 0.3);
        assert!(cfg.timeline.looping);
        assert_eq!(cfg.timeline.default_duration, 5.0);
        assert_eq!(serde_json::to_value(DriveMode::Timeline).unwrap(), "timeline");
    }
}
