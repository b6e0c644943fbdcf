//! Opaque composition objects.
//!
//! The product defines the shape of compositions, decks, layers and clips;
//! this client only moves them around. Each type is a newtype over a JSON
//! object so callers get distinct types without the client validating
//! fields it never reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

macro_rules! opaque_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Map<String, Value>);

        impl $name {
            /// Wrap an existing JSON object.
            #[must_use]
            pub fn new(fields: Map<String, Value>) -> Self {
                Self(fields)
            }

            /// Look up a top-level field.
            #[must_use]
            pub fn get(&self, field: &str) -> Option<&Value> {
                self.0.get(field)
            }

            /// Set a top-level field, returning the previous value.
            pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
                self.0.insert(field.into(), value)
            }

            /// Borrow the underlying JSON object.
            #[must_use]
            pub fn as_map(&self) -> &Map<String, Value> {
                &self.0
            }

            /// Consume and return the underlying JSON object.
            #[must_use]
            pub fn into_inner(self) -> Map<String, Value> {
                self.0
            }
        }

        impl From<Map<String, Value>> for $name {
            fn from(fields: Map<String, Value>) -> Self {
                Self(fields)
            }
        }

        impl TryFrom<Value> for $name {
            type Error = serde_json::Error;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                serde_json::from_value(value)
            }
        }
    };
}

opaque_object! {
    /// The full current project: layers, columns, decks, clips.
    Composition
}

opaque_object! {
    /// A deck (a page of columns) inside a composition.
    Deck
}

opaque_object! {
    /// A column of clips across all layers.
    Column
}

opaque_object! {
    /// A layer of clips.
    Layer
}

opaque_object! {
    /// A single clip slot.
    Clip
}

opaque_object! {
    /// Product name and version as reported by `/product`.
    ProductInfo
}

opaque_object! {
    /// A video effect instance on a clip or layer.
    VideoEffect
}

opaque_object! {
    /// Catalogue of available sources, replaced on every `sources_update`.
    Sources
}

impl Composition {
    /// The composition's `name` field.
    ///
    /// Its presence is also what identifies a composition snapshot on the
    /// socket.
    #[must_use]
    pub fn name(&self) -> Option<&Value> {
        self.get("name")
    }
}

impl Deck {
    /// Numeric deck id used in `/composition/decks/by-id/{id}`.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }
}

impl ProductInfo {
    /// Product name, e.g. `Arena`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Dotted `major.minor.micro` version when all parts are present.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        let part = |field| self.get(field).and_then(Value::as_u64);
        Some(format!(
            "{}.{}.{}",
            part("major")?,
            part("minor")?,
            part("micro")?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deck_id_reads_numeric_field() {
        let deck = Deck::try_from(json!({"id": 1_234_567, "name": {"value": "Deck 1"}})).unwrap();
        assert_eq!(deck.id(), Some(1_234_567));
    }

    #[test]
    fn deck_without_id() {
        let deck = Deck::default();
        assert_eq!(deck.id(), None);
    }

    #[test]
    fn roundtrip_preserves_unknown_fields() {
        let raw = json!({"name": {"value": "Show"}, "layers": [], "bpm": {"value": 120}});
        let comp = Composition::try_from(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&comp).unwrap(), raw);
        assert_eq!(comp.name(), Some(&json!({"value": "Show"})));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(Layer::try_from(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn product_version() {
        let product = ProductInfo::try_from(json!({
            "name": "Arena", "major": 7, "minor": 19, "micro": 2, "revision": 12345
        }))
        .unwrap();
        assert_eq!(product.name(), Some("Arena"));
        assert_eq!(product.version().as_deref(), Some("7.19.2"));
    }

    #[test]
    fn product_version_missing_part() {
        let product = ProductInfo::try_from(json!({"name": "Avenue", "major": 7})).unwrap();
        assert_eq!(product.version(), None);
    }

    #[test]
    fn insert_replaces_field() {
        let mut clip = Clip::default();
        assert!(clip.insert("name", json!("a")).is_none());
        assert_eq!(clip.insert("name", json!("b")), Some(json!("a")));
        assert_eq!(clip.get("name"), Some(&json!("b")));
    }
}
