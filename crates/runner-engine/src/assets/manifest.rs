use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::api::types::{ModelId, SoundEvent};

/// Asset manifest describing the models and sounds of a game.
/// Loaded from a JSON file at runtime; the host uses the same file to load
/// the actual glTF/audio assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Named model lookup: name → model index in the host's model list.
    #[serde(default)]
    pub models: HashMap<String, u32>,
    /// Optional audio assets.
    #[serde(default)]
    pub sounds: HashMap<String, SoundDescriptor>,
}

/// Describes an audio asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Relative path to the audio file.
    pub path: String,
    /// Numeric event ID that triggers this sound from Rust.
    #[serde(default)]
    pub event_id: Option<u32>,
    /// Playback volume (0.0..=1.0).
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sound event for a named sound, if it has an event id.
    pub fn sound_event(&self, name: &str) -> Option<SoundEvent> {
        self.sounds.get(name)?.event_id.map(SoundEvent)
    }

    pub fn model_id(&self, name: &str) -> Option<ModelId> {
        self.models.get(name).copied().map(ModelId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest_with_sounds() {
        let json = r#"{
            "sounds": {
                "jump": { "path": "sfx/jump.ogg", "event_id": 1 },
                "music": { "path": "music.ogg", "volume": 0.4 }
            }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.sounds.len(), 2);

        let jump = &manifest.sounds["jump"];
        assert_eq!(jump.path, "sfx/jump.ogg");
        assert_eq!(jump.volume, 1.0);
        assert_eq!(manifest.sound_event("jump"), Some(SoundEvent(1)));

        // Present but not triggerable from Rust.
        assert_eq!(manifest.sound_event("music"), None);
        assert!((manifest.sounds["music"].volume - 0.4).abs() < 1e-6);
    }

    #[test]
    fn parse_models() {
        let json = r#"{ "models": { "player": 0, "barrier": 2 } }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.model_id("barrier"), Some(ModelId(2)));
        assert_eq!(manifest.model_id("coin"), None);
        assert!(manifest.sounds.is_empty());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AssetManifest::from_json(r#"{ "models": [1, 2] }"#).is_err());
    }
}
