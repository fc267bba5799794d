//! Timeline data model: keyframes and the sequence that owns them.
//!
//! Invariants held by `TimelineSequence` after every mutation:
//! - keyframes are sorted ascending by time (stable: equal times keep write order,
//!   a newly inserted or re-timed keyframe sits last among its equals)
//! - duration >= MIN_DURATION
//! - keyframe times are finite and >= 0; they are NOT clamped to duration

use std::collections::HashSet;

use log::{debug, warn};
use posekit_api_core::Pose;
use serde::{Deserialize, Serialize};

use crate::ids::KeyframeId;

pub const DEFAULT_DURATION: f32 = 5.0;
pub const MIN_DURATION: f32 = 0.1;

/// Interpolation shape from a keyframe to the next one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseInOutQuad,
    /// Hold this keyframe's value until the next keyframe's timestamp.
    Step,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: KeyframeId,
    /// Seconds from the start of the sequence.
    pub time: f32,
    pub pose: Pose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub easing: Easing,
}

/// Partial update merged into an existing keyframe.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframePatch {
    #[serde(default)]
    pub time: Option<f32>,
    #[serde(default)]
    pub pose: Option<Pose>,
    /// `Some(None)` clears the label.
    #[serde(default)]
    pub label: Option<Option<String>>,
    #[serde(default)]
    pub easing: Option<Easing>,
}

/// Clamp a keyframe time; non-finite input maps to 0.
#[inline]
pub(crate) fn sanitize_time(time: f32) -> f32 {
    if time.is_finite() {
        time.max(0.0)
    } else {
        0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SequenceRecord")]
pub struct TimelineSequence {
    duration: f32,
    keyframes: Vec<Keyframe>,
}

impl Default for TimelineSequence {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl TimelineSequence {
    pub fn new(duration: f32) -> Self {
        let mut seq = Self {
            duration: DEFAULT_DURATION,
            keyframes: Vec::new(),
        };
        seq.set_duration(duration);
        seq
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn get(&self, id: &KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| &k.id == id)
    }

    /// Clamp and store the duration. Non-finite input is ignored.
    pub fn set_duration(&mut self, seconds: f32) -> f32 {
        if seconds.is_finite() {
            self.duration = seconds.max(MIN_DURATION);
        } else {
            debug!("ignoring non-finite duration {seconds}");
        }
        self.duration
    }

    /// Insert at the upper bound of its time so it wins ties against older keyframes.
    pub fn insert(&mut self, mut keyframe: Keyframe) {
        keyframe.time = sanitize_time(keyframe.time);
        let t = keyframe.time;
        let pos = self.keyframes.partition_point(|k| k.time <= t);
        self.keyframes.insert(pos, keyframe);
    }

    pub fn remove(&mut self, id: &KeyframeId) -> Option<Keyframe> {
        let pos = self.keyframes.iter().position(|k| &k.id == id)?;
        Some(self.keyframes.remove(pos))
    }

    /// Merge `patch` into keyframe `id`. Returns false (no-op) when the id is unknown.
    /// A changed time re-sorts; a non-finite time is ignored, the other fields still apply.
    pub fn update(&mut self, id: &KeyframeId, patch: KeyframePatch) -> bool {
        let Some(pos) = self.keyframes.iter().position(|k| &k.id == id) else {
            debug!("update ignored: unknown keyframe {id}");
            return false;
        };
        let new_time = match patch.time {
            Some(t) if t.is_finite() => Some(t.max(0.0)),
            Some(t) => {
                debug!("update of {id}: ignoring non-finite time {t}");
                None
            }
            None => None,
        };

        let kf = &mut self.keyframes[pos];
        if let Some(pose) = patch.pose {
            kf.pose = pose;
        }
        if let Some(label) = patch.label {
            kf.label = label;
        }
        if let Some(easing) = patch.easing {
            kf.easing = easing;
        }
        if let Some(t) = new_time {
            if t != kf.time {
                let mut moved = self.keyframes.remove(pos);
                moved.time = t;
                self.insert(moved);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Keyframes at or before the duration; later ones are retained but inert.
    pub fn playable_keyframes(&self) -> impl Iterator<Item = &Keyframe> + '_ {
        let end = self.duration;
        self.keyframes.iter().filter(move |k| k.time <= end)
    }

    pub fn is_sorted(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].time <= w[1].time)
    }
}

/// Wire shape of a sequence; converted into a `TimelineSequence` with invariants restored.
#[derive(Deserialize)]
struct SequenceRecord {
    duration: f32,
    #[serde(default)]
    keyframes: Vec<Keyframe>,
}

impl From<SequenceRecord> for TimelineSequence {
    fn from(record: SequenceRecord) -> Self {
        let mut seq = TimelineSequence::new(record.duration);
        let mut seen = HashSet::new();
        let mut keyframes = record.keyframes;
        for kf in &mut keyframes {
            kf.time = sanitize_time(kf.time);
            if !seen.insert(kf.id.clone()) {
                let fresh = KeyframeId::generate();
                warn!("duplicate keyframe id {}; reassigned {}", kf.id, fresh);
                kf.id = fresh;
                seen.insert(kf.id.clone());
            }
        }
        // stable: stored order is the tie order
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        seq.keyframes = keyframes;
        seq
    }
}
