//! Well-known facial expression channel names.
//!
//! Channels are open-ended strings; these are the ones the retargeting
//! pipeline produces. Consumers ignore names they do not know.

pub const BLINK_LEFT: &str = "blinkLeft";
pub const BLINK_RIGHT: &str = "blinkRight";
/// Combined blink, non-zero only when both eyes are mostly closed.
pub const BLINK: &str = "blink";

pub const VISEME_AA: &str = "aa";
pub const VISEME_IH: &str = "ih";
pub const VISEME_OU: &str = "ou";
pub const VISEME_EE: &str = "ee";
pub const VISEME_OH: &str = "oh";

pub const BROW_UP: &str = "browUp";

pub const ALL_CHANNELS: [&str; 9] = [
    BLINK_LEFT,
    BLINK_RIGHT,
    BLINK,
    VISEME_AA,
    VISEME_IH,
    VISEME_OU,
    VISEME_EE,
    VISEME_OH,
    BROW_UP,
];

/// Clamp a weight into [0, 1]; non-finite input yields `None`.
#[inline]
pub fn clamp_weight(weight: f32) -> Option<f32> {
    if weight.is_finite() {
        Some(weight.clamp(0.0, 1.0))
    } else {
        None
    }
}
