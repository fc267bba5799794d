//! Output contracts from the timeline engine.
//!
//! Each tick yields the frame's skeleton writes plus the semantic events that
//! happened since the previous tick. Hosts apply the batch and forward events.

use posekit_api_core::PoseWriteBatch;
use serde::{Deserialize, Serialize};

use crate::ids::KeyframeId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum TimelineEvent {
    PlaybackStarted { time: f32 },
    PlaybackStopped { time: f32 },
    /// Reached the end without looping; playback is now stopped.
    PlaybackEnded { time: f32 },
    /// Wrapped from the end back to the start.
    Looped,
    TimeChanged { old_time: f32, new_time: f32 },
    KeyframeReached { id: KeyframeId, time: f32 },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineOutputs {
    #[serde(default)]
    pub batch: PoseWriteBatch,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

impl TimelineOutputs {
    #[inline]
    pub fn push_event(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.events.is_empty()
    }
}
