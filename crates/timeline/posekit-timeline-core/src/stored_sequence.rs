//! Persistence boundary for timeline sequences.
//!
//! Wire shape (consumed by the project save/load collaborator):
//!   { "duration": 5.0, "keyframes": [{ "id", "time", "pose", "label"?, "easing"? }] }
//!
//! Loading restores every sequence invariant (sorting, duration clamp, unit
//! quaternions, weight clamp); only malformed JSON is an error.

use thiserror::Error;

use crate::data::TimelineSequence;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("timeline json parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("serialize timeline: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub fn parse_sequence_json(s: &str) -> Result<TimelineSequence, SequenceError> {
    serde_json::from_str(s).map_err(SequenceError::Parse)
}

pub fn parse_sequence_value(value: serde_json::Value) -> Result<TimelineSequence, SequenceError> {
    serde_json::from_value(value).map_err(SequenceError::Parse)
}

pub fn sequence_to_json(sequence: &TimelineSequence) -> Result<String, SequenceError> {
    serde_json::to_string(sequence).map_err(SequenceError::Serialize)
}
