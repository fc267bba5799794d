//! posekit timeline core
//!
//! Owns a keyframe sequence, edits it, compiles it into per-joint tracks and
//! samples those tracks for playback, baking and scrubbing. Engine-agnostic:
//! results are `Pose` values or `PoseWriteBatch`es for a bound skeleton.

pub mod baking;
pub mod config;
pub mod data;
pub mod engine;
pub mod ids;
pub mod interp;
pub mod outputs;
pub mod stored_sequence;
pub mod tracks;

// Re-exports for hosts
pub use baking::{
    bake_sequence, export_baked_json, BakedFrame, BakedSequence, BakingConfig, MAX_BAKED_FRAMES,
};
pub use config::TimelineConfig;
pub use data::{
    Easing, Keyframe, KeyframePatch, TimelineSequence, DEFAULT_DURATION, MIN_DURATION,
};
pub use engine::{PlayState, TimelineEngine};
pub use ids::KeyframeId;
pub use outputs::{TimelineEvent, TimelineOutputs};
pub use stored_sequence::{
    parse_sequence_json, parse_sequence_value, sequence_to_json, SequenceError,
};
pub use tracks::{compile_to_tracks, CompiledTracks, Sample, Track};
