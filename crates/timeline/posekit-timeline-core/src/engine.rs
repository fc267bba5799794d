//! Timeline engine: sequence ownership, editing, selection and playback.
//!
//! Methods:
//! - add/update/remove/select keyframes, set_duration, set_current_time, clear_timeline
//! - play/stop, tick (advance → sample → outputs)
//!
//! Every operation is total: unknown ids are no-ops and times/durations are
//! clamped rather than rejected. Compiled tracks are rebuilt after each edit.

use log::debug;
use posekit_api_core::{Pose, PoseWriteBatch};
use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;
use crate::data::{sanitize_time, Easing, Keyframe, KeyframePatch, TimelineSequence};
use crate::ids::KeyframeId;
use crate::outputs::{TimelineEvent, TimelineOutputs};
use crate::tracks::{compile_to_tracks, CompiledTracks};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if m < 0.0 {
        m + b
    } else {
        m
    }
}

#[derive(Debug)]
pub struct TimelineEngine {
    cfg: TimelineConfig,
    sequence: TimelineSequence,
    tracks: CompiledTracks,
    current_time: f32,
    state: PlayState,
    selected: Option<KeyframeId>,
    speed: f32,
    looping: bool,
    // Play/stop events raised between ticks, flushed by the next tick. A start
    // and stop with no tick in between cancel out.
    pending: Vec<TimelineEvent>,
    // Set by play(); the next advance also reports keyframes at the start time.
    from_rest: bool,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl TimelineEngine {
    pub fn new(cfg: TimelineConfig) -> Self {
        let sequence = TimelineSequence::new(cfg.default_duration);
        let mut engine = Self {
            speed: 1.0,
            looping: cfg.looping,
            cfg,
            tracks: CompiledTracks::default(),
            sequence,
            current_time: 0.0,
            state: PlayState::Stopped,
            selected: None,
            pending: Vec::new(),
            from_rest: false,
        };
        engine.set_speed(engine.cfg.speed);
        engine
    }

    /// Adopt a loaded sequence, resetting selection and playback.
    pub fn with_sequence(cfg: TimelineConfig, sequence: TimelineSequence) -> Self {
        let mut engine = Self::new(cfg);
        engine.replace_sequence(sequence);
        engine
    }

    pub fn sequence(&self) -> &TimelineSequence {
        &self.sequence
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        self.sequence.keyframes()
    }

    pub fn keyframe(&self, id: &KeyframeId) -> Option<&Keyframe> {
        self.sequence.get(id)
    }

    pub fn tracks(&self) -> &CompiledTracks {
        &self.tracks
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.sequence.duration()
    }

    #[inline]
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    #[inline]
    pub fn state(&self) -> PlayState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn selected(&self) -> Option<&KeyframeId> {
        self.selected.as_ref()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    fn recompile(&mut self) {
        self.tracks = compile_to_tracks(&self.sequence);
    }

    // ---- editing ----

    /// Insert a keyframe and return its fresh id. Non-finite or negative times become 0.
    pub fn add_keyframe(
        &mut self,
        pose: Pose,
        time: f32,
        label: Option<String>,
        easing: Option<Easing>,
    ) -> KeyframeId {
        let id = KeyframeId::generate();
        self.sequence.insert(Keyframe {
            id: id.clone(),
            time: sanitize_time(time),
            pose,
            label,
            easing: easing.unwrap_or_default(),
        });
        self.recompile();
        id
    }

    /// Merge `patch` into keyframe `id`. Unknown ids are a no-op (returns false).
    pub fn update_keyframe(&mut self, id: &KeyframeId, patch: KeyframePatch) -> bool {
        let changed = self.sequence.update(id, patch);
        if changed {
            self.recompile();
        }
        changed
    }

    /// Remove keyframe `id`, clearing the selection when it pointed at it.
    pub fn remove_keyframe(&mut self, id: &KeyframeId) -> Option<Keyframe> {
        let removed = self.sequence.remove(id);
        match &removed {
            Some(_) => {
                if self.selected.as_ref() == Some(id) {
                    self.selected = None;
                }
                self.recompile();
            }
            None => debug!("remove ignored: unknown keyframe {id}"),
        }
        removed
    }

    /// Select keyframe `id`. Unknown ids leave the selection unchanged.
    pub fn select_keyframe(&mut self, id: &KeyframeId) -> bool {
        if self.sequence.get(id).is_some() {
            self.selected = Some(id.clone());
            true
        } else {
            debug!("select ignored: unknown keyframe {id}");
            false
        }
    }

    /// Clamp the duration to >= MIN_DURATION and pull the playhead back inside it.
    pub fn set_duration(&mut self, seconds: f32) -> f32 {
        let d = self.sequence.set_duration(seconds);
        if self.current_time > d {
            self.current_time = d;
        }
        self.recompile();
        d
    }

    /// Move the playhead, clamped to [0, duration]. Does not change the play state.
    /// A non-finite request is ignored.
    pub fn set_current_time(&mut self, seconds: f32) -> f32 {
        if seconds.is_finite() {
            self.current_time = seconds.clamp(0.0, self.duration());
        } else {
            debug!("ignoring non-finite playhead time {seconds}");
        }
        self.current_time
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Playback rate; negative input is clamped to 0, non-finite ignored.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        if speed.is_finite() {
            self.speed = speed.max(0.0);
        }
        self.speed
    }

    /// Empty sequence at the default duration, no selection, stopped at 0.
    pub fn clear_timeline(&mut self) {
        self.replace_sequence(TimelineSequence::new(self.cfg.default_duration));
    }

    /// Swap in another sequence (e.g. loaded from a project), resetting playback.
    pub fn replace_sequence(&mut self, sequence: TimelineSequence) {
        self.stop();
        self.sequence = sequence;
        self.selected = None;
        self.current_time = 0.0;
        self.recompile();
    }

    // ---- playback ----

    /// Stopped → Playing. Restarts from 0 when parked at the end of a non-looping timeline.
    /// Keyframes at the starting playhead are reported by the next tick.
    pub fn play(&mut self) {
        if self.state == PlayState::Playing {
            return;
        }
        self.state = PlayState::Playing;
        if !self.looping && self.current_time >= self.duration() {
            self.current_time = 0.0;
        } else if matches!(
            self.pending.last(),
            Some(TimelineEvent::PlaybackStopped { time }) if *time == self.current_time
        ) {
            // resumed before any tick saw the stop
            self.pending.pop();
            return;
        }
        self.from_rest = true;
        self.pending.push(TimelineEvent::PlaybackStarted {
            time: self.current_time,
        });
    }

    /// Playing → Stopped. The playhead stays where it is.
    pub fn stop(&mut self) {
        if self.state == PlayState::Stopped {
            return;
        }
        self.state = PlayState::Stopped;
        self.from_rest = false;
        if matches!(self.pending.last(), Some(TimelineEvent::PlaybackStarted { .. })) {
            self.pending.pop();
            return;
        }
        self.pending.push(TimelineEvent::PlaybackStopped {
            time: self.current_time,
        });
    }

    /// Sample the compiled tracks at `time`.
    pub fn sample(&self, time: f32) -> Pose {
        self.tracks.sample_pose(time)
    }

    pub fn sample_batch(&self, time: f32) -> PoseWriteBatch {
        self.tracks.sample_batch(time)
    }

    /// Skeleton writes for the current playhead.
    pub fn current_batch(&self) -> PoseWriteBatch {
        self.sample_batch(self.current_time)
    }

    /// Advance the playhead by `dt * speed` when playing, then sample the frame.
    pub fn tick(&mut self, dt: f32) -> TimelineOutputs {
        let mut out = TimelineOutputs {
            batch: PoseWriteBatch::new(),
            events: std::mem::take(&mut self.pending),
        };

        if self.state == PlayState::Playing {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            self.advance(dt * self.speed, &mut out);
        }

        if !self.tracks.is_empty() {
            out.batch = self.current_batch();
        }
        out
    }

    fn advance(&mut self, delta: f32, out: &mut TimelineOutputs) {
        let duration = self.duration();
        let old = self.current_time;
        let target = old + delta;
        let from_rest = std::mem::take(&mut self.from_rest);

        if target < duration {
            self.current_time = target;
            self.emit_reached(old, target, from_rest, out);
        } else if self.looping {
            self.current_time = fmod(target, duration);
            self.emit_reached(old, duration, from_rest, out);
            out.push_event(TimelineEvent::Looped);
            self.emit_reached(0.0, self.current_time, true, out);
        } else {
            self.current_time = duration;
            self.emit_reached(old, duration, from_rest, out);
            self.state = PlayState::Stopped;
            out.push_event(TimelineEvent::PlaybackEnded { time: duration });
        }

        if self.current_time != old {
            out.push_event(TimelineEvent::TimeChanged {
                old_time: old,
                new_time: self.current_time,
            });
        }
    }

    /// Emit KeyframeReached for keyframes in (from, to], or [from, to] when `inclusive_start`.
    fn emit_reached(&self, from: f32, to: f32, inclusive_start: bool, out: &mut TimelineOutputs) {
        for kf in self.sequence.playable_keyframes() {
            let after_start = if inclusive_start {
                kf.time >= from
            } else {
                kf.time > from
            };
            if after_start && kf.time <= to {
                out.push_event(TimelineEvent::KeyframeReached {
                    id: kf.id.clone(),
                    time: kf.time,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posekit_api_core::{SkeletonJoint, IDENTITY_QUAT};

    fn pose() -> Pose {
        Pose::new().with_joint(SkeletonJoint::Head, IDENTITY_QUAT)
    }

    #[test]
    fn playhead_is_clamped_to_duration() {
        let mut engine = TimelineEngine::default();
        engine.set_duration(2.0);
        assert_eq!(engine.set_current_time(5.0), 2.0);
        assert_eq!(engine.set_current_time(-1.0), 0.0);
        assert_eq!(engine.set_current_time(f32::NAN), 0.0);
    }

    #[test]
    fn shrinking_duration_pulls_playhead_back() {
        let mut engine = TimelineEngine::default();
        engine.set_current_time(4.0);
        engine.set_duration(1.0);
        assert_eq!(engine.current_time(), 1.0);
    }

    #[test]
    fn removing_selected_keyframe_clears_selection() {
        let mut engine = TimelineEngine::default();
        let a = engine.add_keyframe(pose(), 0.0, None, None);
        let b = engine.add_keyframe(pose(), 1.0, None, None);
        assert!(engine.select_keyframe(&a));
        engine.remove_keyframe(&b);
        assert_eq!(engine.selected(), Some(&a));
        engine.remove_keyframe(&a);
        assert_eq!(engine.selected(), None);
        assert!(!engine.select_keyframe(&a));
    }

    #[test]
    fn play_runs_to_end_then_stops() {
        let mut engine = TimelineEngine::default();
        engine.set_duration(1.0);
        engine.add_keyframe(pose(), 0.5, None, None);
        engine.play();
        let out = engine.tick(0.6);
        assert!(matches!(
            out.events[0],
            TimelineEvent::PlaybackStarted { .. }
        ));
        assert!(out
            .events
            .iter()
            .any(|e| matches!(e, TimelineEvent::KeyframeReached { time, .. } if *time == 0.5)));
        assert!(engine.is_playing());
        let out = engine.tick(0.6);
        assert_eq!(engine.current_time(), 1.0);
        assert_eq!(engine.state(), PlayState::Stopped);
        assert!(out
            .events
            .iter()
            .any(|e| matches!(e, TimelineEvent::PlaybackEnded { .. })));
    }

    #[test]
    fn looping_wraps_instead_of_stopping() {
        let mut engine = TimelineEngine::default();
        engine.set_duration(1.0);
        engine.set_looping(true);
        engine.play();
        let out = engine.tick(1.25);
        assert!(engine.is_playing());
        assert!((engine.current_time() - 0.25).abs() < 1e-6);
        assert!(out.events.contains(&TimelineEvent::Looped));
    }

    #[test]
    fn scrubbing_keeps_play_state() {
        let mut engine = TimelineEngine::default();
        engine.play();
        engine.set_current_time(2.0);
        assert!(engine.is_playing());
        engine.stop();
        engine.set_current_time(3.0);
        assert_eq!(engine.state(), PlayState::Stopped);
        assert_eq!(engine.current_time(), 3.0);
    }

    #[test]
    fn stopped_tick_does_not_advance() {
        let mut engine = TimelineEngine::default();
        engine.add_keyframe(pose(), 0.0, None, None);
        let out = engine.tick(1.0);
        assert_eq!(engine.current_time(), 0.0);
        assert_eq!(out.batch.len(), 1);
        assert!(out.events.is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut engine = TimelineEngine::default();
        let id = engine.add_keyframe(pose(), 1.0, None, None);
        engine.select_keyframe(&id);
        engine.set_duration(9.0);
        engine.set_current_time(3.0);
        engine.play();
        engine.clear_timeline();
        assert!(engine.keyframes().is_empty());
        assert_eq!(engine.duration(), crate::data::DEFAULT_DURATION);
        assert_eq!(engine.selected(), None);
        assert_eq!(engine.state(), PlayState::Stopped);
        assert_eq!(engine.current_time(), 0.0);
        assert!(engine.tracks().is_empty());
    }

    #[test]
    fn keyframe_at_start_fires_on_first_tick() {
        let mut engine = TimelineEngine::default();
        let id = engine.add_keyframe(pose(), 0.0, None, None);
        engine.play();
        let out = engine.tick(0.1);
        let reached: Vec<_> = out
            .events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::KeyframeReached { .. }))
            .collect();
        assert_eq!(
            reached,
            [&TimelineEvent::KeyframeReached { id, time: 0.0 }]
        );
        let out = engine.tick(0.1);
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, TimelineEvent::KeyframeReached { .. })));
    }

    #[test]
    fn play_stop_without_ticks_does_not_queue() {
        let mut engine = TimelineEngine::default();
        for _ in 0..1000 {
            engine.play();
            engine.stop();
        }
        engine.play();
        let out = engine.tick(0.1);
        assert_eq!(out.events.len(), 2);
        assert!(matches!(out.events[0], TimelineEvent::PlaybackStarted { time } if time == 0.0));

        // stop then resume before a tick reports nothing
        engine.stop();
        engine.play();
        let out = engine.tick(0.1);
        assert!(!out.events.iter().any(|e| matches!(
            e,
            TimelineEvent::PlaybackStarted { .. } | TimelineEvent::PlaybackStopped { .. }
        )));

        engine.stop();
        let out = engine.tick(0.1);
        assert!(matches!(out.events[..], [TimelineEvent::PlaybackStopped { .. }]));
    }
}
