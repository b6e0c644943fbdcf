//! Outbound actions sent over the WebSocket.
//!
//! Every frame the client writes is one [`Action`], serialized as a JSON
//! object whose `action` field selects the variant:
//!
//! ```json
//! {"action": "subscribe", "parameter": "/parameter/by-id/5"}
//! {"action": "set", "parameter": "/composition/master", "value": 0.5}
//! {"action": "post", "path": "/composition/layers/1/clips/1/open", "body": "file:///a.mov"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parameter::ParameterKey;

/// Discriminant values of the `action` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Assign a parameter value.
    Set,
    /// Fire a trigger parameter.
    Trigger,
    /// Start receiving updates for a parameter.
    Subscribe,
    /// Stop receiving updates for a parameter.
    Unsubscribe,
    /// Post a body to a REST-style path over the socket.
    Post,
}

impl ActionType {
    /// Wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Trigger => "trigger",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Post => "post",
        }
    }
}

/// A single outbound frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Assign `value` to `parameter`.
    Set {
        /// Target parameter.
        parameter: ParameterKey,
        /// New value, shaped per the parameter's value type.
        value: Value,
    },
    /// Fire a trigger parameter (`value` mimics press/release).
    Trigger {
        /// Target parameter.
        parameter: ParameterKey,
        /// Optional pressed state.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    /// Subscribe to updates of `parameter`.
    Subscribe {
        /// Target parameter.
        parameter: ParameterKey,
    },
    /// Unsubscribe from updates of `parameter`.
    Unsubscribe {
        /// Target parameter.
        parameter: ParameterKey,
    },
    /// Post `body` to `path`.
    Post {
        /// REST-style path relative to the API root.
        path: String,
        /// Request body, usually a URI such as `file:///clip.mov`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        /// Caller-chosen correlation id echoed by the product.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl Action {
    /// Build a subscribe action.
    #[must_use]
    pub fn subscribe(parameter: impl Into<ParameterKey>) -> Self {
        Self::Subscribe {
            parameter: parameter.into(),
        }
    }

    /// Build an unsubscribe action.
    #[must_use]
    pub fn unsubscribe(parameter: impl Into<ParameterKey>) -> Self {
        Self::Unsubscribe {
            parameter: parameter.into(),
        }
    }

    /// The discriminant of this action.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Set { .. } => ActionType::Set,
            Self::Trigger { .. } => ActionType::Trigger,
            Self::Subscribe { .. } => ActionType::Subscribe,
            Self::Unsubscribe { .. } => ActionType::Unsubscribe,
            Self::Post { .. } => ActionType::Post,
        }
    }

    /// The parameter or path this action targets.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Set { parameter, .. }
            | Self::Trigger { parameter, .. }
            | Self::Subscribe { parameter }
            | Self::Unsubscribe { parameter } => parameter.as_str(),
            Self::Post { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_wire_shape() {
        let action = Action::subscribe(5_i64);
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "subscribe", "parameter": "/parameter/by-id/5"})
        );
    }

    #[test]
    fn unsubscribe_wire_shape() {
        let action = Action::unsubscribe("/composition/master");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "unsubscribe", "parameter": "/composition/master"})
        );
    }

    #[test]
    fn set_carries_arbitrary_value() {
        let action = Action::Set {
            parameter: ParameterKey::from("/composition/tempocontroller/tempo"),
            value: json!(128.0),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "action": "set",
                "parameter": "/composition/tempocontroller/tempo",
                "value": 128.0
            })
        );
    }

    #[test]
    fn trigger_omits_missing_value() {
        let action = Action::Trigger {
            parameter: ParameterKey::from(9_i64),
            value: None,
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "trigger", "parameter": "/parameter/by-id/9"})
        );
    }

    #[test]
    fn post_omits_missing_fields() {
        let action = Action::Post {
            path: "/composition/columns/add".into(),
            body: None,
            id: Some("req-1".into()),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "post", "path": "/composition/columns/add", "id": "req-1"})
        );
    }

    #[test]
    fn action_type_matches_wire_tag() {
        let action = Action::subscribe("/x");
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], action.action_type().as_str());
        assert_eq!(action.target(), "/x");
    }
}
