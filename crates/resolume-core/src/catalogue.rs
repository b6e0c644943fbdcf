//! Effects catalogue pushed by the product over the socket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A preset stored for an effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPreset {
    /// Preset id.
    #[serde(default)]
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// An effect that can be added to a clip or layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Stable identifier, e.g. `A101`.
    #[serde(default)]
    pub idstring: String,
    /// Display name; also the name used in `effect:///video/<name>`.
    #[serde(default)]
    pub name: String,
    /// Stored presets.
    #[serde(default)]
    pub presets: Vec<EffectPreset>,
}

/// All available effects, split by media type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectsCatalogue {
    /// Video effects.
    #[serde(rename = "Video", default)]
    pub video: Vec<Effect>,
    /// Audio effects.
    #[serde(rename = "Audio", default)]
    pub audio: Vec<Effect>,
}

impl EffectsCatalogue {
    /// Typed view of an `effects_update` payload.
    ///
    /// `None` unless `value` is an object. Entries that are not effect
    /// objects are skipped; missing fields default.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let list = |field: &str| -> Vec<Effect> {
            object
                .get(field)
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                        .collect()
                })
                .unwrap_or_default()
        };
        Some(Self {
            video: list("Video"),
            audio: list("Audio"),
        })
    }

    /// Find a video effect by display name.
    #[must_use]
    pub fn video_effect(&self, name: &str) -> Option<&Effect> {
        self.video.iter().find(|effect| effect.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_video_and_audio_lists() {
        let catalogue: EffectsCatalogue = serde_json::from_value(json!({
            "Video": [{"idstring": "A101", "name": "Blur", "presets": [{"id": 1, "name": "Soft"}]}],
            "Audio": [{"idstring": "B202", "name": "Delay"}]
        }))
        .unwrap();
        assert_eq!(catalogue.video.len(), 1);
        assert_eq!(catalogue.video[0].presets[0].name, "Soft");
        assert!(catalogue.audio[0].presets.is_empty());
        assert_eq!(catalogue.video_effect("Blur").unwrap().idstring, "A101");
        assert!(catalogue.video_effect("Delay").is_none());
    }

    #[test]
    fn from_value_fills_missing_fields() {
        let catalogue =
            EffectsCatalogue::from_value(&json!({"Video": [{"name": "Hue"}], "Audio": []})).unwrap();
        assert_eq!(catalogue.video[0].name, "Hue");
        assert_eq!(catalogue.video[0].idstring, "");
        assert!(catalogue.audio.is_empty());
    }

    #[test]
    fn from_value_skips_bad_entries() {
        let catalogue = EffectsCatalogue::from_value(&json!({
            "Video": [42, {"idstring": "A1", "name": "Blur"}],
            "Audio": "none"
        }))
        .unwrap();
        assert_eq!(catalogue.video.len(), 1);
        assert!(catalogue.audio.is_empty());
    }

    #[test]
    fn from_value_requires_object() {
        assert!(EffectsCatalogue::from_value(&json!(null)).is_none());
        assert!(EffectsCatalogue::from_value(&json!([1])).is_none());
    }
}
