//! Timeline engine configuration.

use serde::{Deserialize, Serialize};

use crate::data::DEFAULT_DURATION;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Duration given to new and cleared sequences, in seconds.
    pub default_duration: f32,
    /// Playback rate multiplier applied to tick deltas.
    pub speed: f32,
    /// Wrap to the start instead of stopping at the end.
    pub looping: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION,
            speed: 1.0,
            looping: false,
        }
    }
}
