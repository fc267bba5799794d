use serde::{Deserialize, Serialize};

/// Retargeting configuration.
/// - body_alpha / head_alpha: slerp factor per frame toward the new estimate (1 = no smoothing).
/// - apply_root_position: write the tracked hips offset to the rig (tracked either way).
/// - mirror: selfie-camera correction, swaps left/right and reflects rotations.
/// - min_*_confidence: a modality reporting confidence below this contributes nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub body_alpha: f32,
    pub head_alpha: f32,
    pub apply_root_position: bool,
    pub root_position_scale: f32,
    pub mirror: bool,
    pub min_body_confidence: f32,
    pub min_face_confidence: f32,
    /// Both per-eye blink weights must exceed this before the combined `blink` fires.
    pub blink_threshold: f32,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            body_alpha: 0.3,
            head_alpha: 0.5,
            apply_root_position: false,
            root_position_scale: 1.0,
            mirror: false,
            min_body_confidence: 0.5,
            min_face_confidence: 0.5,
            blink_threshold: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RetargetConfig =
            serde_json::from_str(r#"{ "mirror": true, "body_alpha": 0.6 }"#).unwrap();
        assert!(cfg.mirror);
        assert_eq!(cfg.body_alpha, 0.6);
        assert_eq!(cfg.head_alpha, 0.5);
        assert!(!cfg.apply_root_position);
    }
}
