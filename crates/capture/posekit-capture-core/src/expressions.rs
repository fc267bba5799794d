//! Face estimate → expression channel weights.

use std::collections::BTreeMap;

use posekit_api_core::expression::{clamp_weight, BLINK, BLINK_LEFT, BLINK_RIGHT, BROW_UP};

use crate::solver::FaceEstimate;

/// Fuse a face estimate into channel weights (all clamped to [0, 1]).
/// - blinkLeft / blinkRight = 1 − eye openness
/// - blink = mean of both, only when both exceed `blink_threshold`, else 0
/// - mouth visemes pass through 1:1, brow maps to browUp
///
/// With `mirror`, the eyes are swapped before fusing.
pub fn fuse_expressions(
    face: &FaceEstimate,
    blink_threshold: f32,
    mirror: bool,
) -> BTreeMap<String, f32> {
    let mut out = BTreeMap::new();

    if let Some(eyes) = face.eyes {
        let (left, right) = if mirror {
            (eyes.right, eyes.left)
        } else {
            (eyes.left, eyes.right)
        };
        if let (Some(bl), Some(br)) = (clamp_weight(1.0 - left), clamp_weight(1.0 - right)) {
            let both = if bl > blink_threshold && br > blink_threshold {
                (bl + br) * 0.5
            } else {
                0.0
            };
            out.insert(BLINK_LEFT.to_string(), bl);
            out.insert(BLINK_RIGHT.to_string(), br);
            out.insert(BLINK.to_string(), both);
        }
    }

    if let Some(mouth) = &face.mouth {
        for (viseme, w) in mouth {
            if let Some(w) = clamp_weight(*w) {
                out.insert(viseme.clone(), w);
            }
        }
    }

    if let Some(w) = face.brow.and_then(clamp_weight) {
        out.insert(BROW_UP.to_string(), w);
    }
    out
}
