//! Errors surfaced to the page

use serde::{Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    #[error("no frame yet (scene still loading)")]
    FrameNotReady,
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

// Tauri commands hand errors to JS as plain strings
impl Serialize for BridgeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_display_string() {
        let json = serde_json::to_string(&BridgeError::FrameNotReady).unwrap();
        assert_eq!(json, "\"no frame yet (scene still loading)\"");
        let json = serde_json::to_string(&BridgeError::LockPoisoned("pointer")).unwrap();
        assert_eq!(json, "\"pointer lock poisoned\"");
    }
}
