//! Keyframe identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque keyframe id. Fresh ids are UUID v4 strings; loaded ids are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeId(String);

impl KeyframeId {
    pub fn generate() -> Self {
        KeyframeId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyframeId {
    fn from(s: &str) -> Self {
        KeyframeId(s.to_string())
    }
}

impl From<String> for KeyframeId {
    fn from(s: String) -> Self {
        KeyframeId(s)
    }
}

impl fmt::Display for KeyframeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = KeyframeId::generate();
        let b = KeyframeId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
