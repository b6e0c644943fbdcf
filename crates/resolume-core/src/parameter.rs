//! Parameter identity and its canonical subscription key.
//!
//! Parameters are addressed either by numeric id or by path. Both forms
//! collapse into a [`ParameterKey`] string, and two references that produce
//! the same key are the same subscription target:
//!
//! | reference | key |
//! |---|---|
//! | `0` or `"0"` | `""` |
//! | `42` | `/parameter/by-id/42` |
//! | `"/composition/master"` | `/composition/master` |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::PARAMETER_BY_ID_PREFIX;

/// A parameter as supplied by a caller: numeric id or path string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParameterRef {
    /// Numeric parameter id as reported by the product.
    Id(i64),
    /// Hierarchical parameter path.
    Path(String),
}

impl ParameterRef {
    /// Normalize into the canonical registry key.
    #[must_use]
    pub fn key(&self) -> ParameterKey {
        match self {
            Self::Id(0) => ParameterKey::empty(),
            Self::Id(id) => ParameterKey(format!("{PARAMETER_BY_ID_PREFIX}{id}")),
            Self::Path(path) if path == "0" => ParameterKey::empty(),
            Self::Path(path) => ParameterKey(path.clone()),
        }
    }
}

impl From<i64> for ParameterRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<i32> for ParameterRef {
    fn from(id: i32) -> Self {
        Self::Id(i64::from(id))
    }
}

impl From<u32> for ParameterRef {
    fn from(id: u32) -> Self {
        Self::Id(i64::from(id))
    }
}

impl From<&str> for ParameterRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_owned())
    }
}

impl From<String> for ParameterRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<&String> for ParameterRef {
    fn from(path: &String) -> Self {
        Self::Path(path.clone())
    }
}

impl From<ParameterKey> for ParameterRef {
    fn from(key: ParameterKey) -> Self {
        Self::Path(key.0)
    }
}

/// Canonical string form of a parameter, used as the registry key and as
/// the `parameter` field of subscribe/unsubscribe actions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterKey(String);

impl ParameterKey {
    /// The key that id `0` and `"0"` normalize to.
    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParameterKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

macro_rules! key_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParameterKey {
                fn from(reference: $ty) -> Self {
                    ParameterRef::from(reference).key()
                }
            }
        )*
    };
}

key_from!(i64, i32, u32, &str, String, &String);

impl From<&ParameterRef> for ParameterKey {
    fn from(reference: &ParameterRef) -> Self {
        reference.key()
    }
}

impl From<ParameterKey> for String {
    fn from(key: ParameterKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_and_zero_string_normalize_to_empty() {
        assert_eq!(ParameterRef::Id(0).key().as_str(), "");
        assert_eq!(ParameterRef::from("0").key().as_str(), "");
        assert_eq!(ParameterRef::Id(0).key(), ParameterRef::from("0").key());
    }

    #[test]
    fn numeric_id_uses_by_id_template() {
        assert_eq!(ParameterRef::Id(5).key().as_str(), "/parameter/by-id/5");
        assert_eq!(
            ParameterRef::Id(1_731_685_385_591).key().as_str(),
            "/parameter/by-id/1731685385591"
        );
    }

    #[test]
    fn path_passes_through_unchanged() {
        let key = ParameterRef::from("/composition/layers/1/video/opacity").key();
        assert_eq!(key.as_str(), "/composition/layers/1/video/opacity");
    }

    #[test]
    fn numeric_string_is_not_treated_as_id() {
        assert_eq!(ParameterRef::from("5").key().as_str(), "5");
    }

    #[test]
    fn id_and_matching_path_share_a_key() {
        let by_id = ParameterKey::from(7_i64);
        let by_path = ParameterKey::from("/parameter/by-id/7");
        assert_eq!(by_id, by_path);
    }

    #[test]
    fn normalization_is_deterministic() {
        for reference in [
            ParameterRef::Id(0),
            ParameterRef::Id(-3),
            ParameterRef::Id(99),
            ParameterRef::from(""),
            ParameterRef::from("/a/b"),
        ] {
            assert_eq!(reference.key(), reference.key());
        }
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = ParameterKey::from(12_i64);
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            r#""/parameter/by-id/12""#
        );
    }
}
