//! Inbound WebSocket frames and their classification.
//!
//! Frames arrive as JSON objects in one of five shapes. Three carry an
//! explicit `type` discriminant; compositions and errors do not, so they are
//! recognized by the presence of a field. [`InboundMessage::classify`] checks
//! the shapes in one fixed order and the first match wins:
//!
//! 1. parameter message: `type` is one of the `parameter_*` values
//! 2. sources update: `type == "sources_update"`
//! 3. effects update: `type == "effects_update"`
//! 4. composition snapshot: has a `name` field
//! 5. error: has an `error` field
//!
//! Anything else is unmatched and yields `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::parameter::{ParameterKey, ParameterRef};
use crate::schema::Composition;

const SOURCES_UPDATE: &str = "sources_update";
const EFFECTS_UPDATE: &str = "effects_update";

/// Which parameter event a [`ParameterMessage`] reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterEvent {
    /// The value changed.
    #[serde(rename = "parameter_update")]
    Update,
    /// A `set` action was applied.
    #[serde(rename = "parameter_set")]
    Set,
    /// A subscription was confirmed; carries the current value.
    #[serde(rename = "parameter_subscribed")]
    Subscribed,
    /// A subscription was removed.
    #[serde(rename = "parameter_unsubscribed")]
    Unsubscribed,
}

impl ParameterEvent {
    /// Parse a `type` field value.
    #[must_use]
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "parameter_update" => Some(Self::Update),
            "parameter_set" => Some(Self::Set),
            "parameter_subscribed" => Some(Self::Subscribed),
            "parameter_unsubscribed" => Some(Self::Unsubscribed),
            _ => None,
        }
    }
}

/// Kind of value a parameter holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Single-line string.
    ParamString,
    /// Multi-line text.
    ParamText,
    /// On/off.
    ParamBoolean,
    /// Integer with optional bounds.
    ParamInteger,
    /// RGBA color.
    ParamColor,
    /// Float within a range.
    ParamRange,
    /// One of a fixed set of options.
    ParamChoice,
    /// Choice-like state parameter.
    ParamState,
    /// Momentary event.
    ParamEvent,
    /// Fire-and-forget trigger.
    ParamTrigger,
    /// A value type this client does not know.
    #[serde(other)]
    Unknown,
}

/// A parameter update, set confirmation, or (un)subscribe confirmation.
///
/// Only the fields needed for routing are typed; everything else the product
/// sends (`min`, `max`, `options`, ...) is kept in [`extra`](Self::extra).
/// A routed field whose JSON type does not fit stays in `extra` and the typed
/// field is `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterMessage {
    /// Event kind.
    #[serde(rename = "type")]
    pub event: ParameterEvent,
    /// Numeric parameter id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Parameter path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Value type tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuetype: Option<ValueType>,
    /// Current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Remaining fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParameterMessage {
    /// Build from a frame object whose `type` reported `event`. Never fails.
    ///
    /// `id` accepts any whole number, `path` and `valuetype` any string.
    #[must_use]
    pub fn from_object(event: ParameterEvent, mut object: Map<String, Value>) -> Self {
        let _ = object.remove("type");
        let id = take_field(&mut object, "id", whole_number);
        let path = take_field(&mut object, "path", |v| v.as_str().map(str::to_owned));
        let valuetype = take_field(&mut object, "valuetype", value_type);
        let value = object.remove("value");
        Self {
            event,
            id,
            path,
            valuetype,
            value,
            extra: object,
        }
    }

    /// Registry key derived from the numeric id.
    #[must_use]
    pub fn id_key(&self) -> Option<ParameterKey> {
        self.id.map(|id| ParameterRef::Id(id).key())
    }

    /// Registry key taken verbatim from the message path.
    #[must_use]
    pub fn path_key(&self) -> Option<ParameterKey> {
        self.path.as_deref().map(ParameterKey::from)
    }
}

/// An error reported by the product over the socket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    /// Error text; absent when the field is `null` or not a string.
    pub error: Option<String>,
    /// Parameter id the error relates to.
    pub id: Option<i64>,
    /// Path the error relates to.
    pub path: Option<String>,
}

impl ErrorMessage {
    /// Read the routed fields of an error frame. Never fails.
    #[must_use]
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let string = |field| object.get(field).and_then(Value::as_str).map(str::to_owned);
        Self {
            error: string("error"),
            id: object.get("id").and_then(whole_number),
            path: string("path"),
        }
    }
}

/// One classified inbound frame.
///
/// Catalogue updates carry their `value` as sent (`Null` when missing); the
/// catalogue is replaced by whatever arrived.
/// [`Sources`](crate::schema::Sources) and
/// [`EffectsCatalogue::from_value`](crate::catalogue::EffectsCatalogue::from_value)
/// give typed views.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    /// Parameter-class message.
    Parameter(ParameterMessage),
    /// Replacement sources catalogue.
    Sources(Value),
    /// Replacement effects catalogue.
    Effects(Value),
    /// Full composition snapshot.
    Composition(Composition),
    /// Error frame.
    Error(ErrorMessage),
}

impl InboundMessage {
    /// Parse a text frame and classify it.
    ///
    /// Returns `Err` when the frame is not JSON and `Ok(None)` when it is JSON
    /// but matches none of the known shapes.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::classify(value))
    }

    /// Classify an already-parsed frame.
    ///
    /// Only the discriminant decides the variant; payload fields are read
    /// leniently, so a matched frame is never dropped.
    #[must_use]
    pub fn classify(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let tag = tag.as_deref();

        if let Some(event) = tag.and_then(ParameterEvent::from_wire) {
            return Some(Self::Parameter(ParameterMessage::from_object(event, object)));
        }
        if tag == Some(SOURCES_UPDATE) {
            return Some(Self::Sources(object.remove("value").unwrap_or_default()));
        }
        if tag == Some(EFFECTS_UPDATE) {
            return Some(Self::Effects(object.remove("value").unwrap_or_default()));
        }
        if object.contains_key("name") {
            return Some(Self::Composition(Composition::new(object)));
        }
        if object.contains_key("error") {
            return Some(Self::Error(ErrorMessage::from_object(&object)));
        }
        None
    }

    /// Short label for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parameter(_) => "parameter",
            Self::Sources(_) => "sources",
            Self::Effects(_) => "effects",
            Self::Composition(_) => "composition",
            Self::Error(_) => "error",
        }
    }
}

/// Remove `field` from `object` only if `read` accepts it.
fn take_field<T>(
    object: &mut Map<String, Value>,
    field: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let parsed = object.get(field).and_then(read);
    if parsed.is_some() {
        let _ = object.remove(field);
    } else if object.contains_key(field) {
        debug!(field, "parameter field has unexpected type, kept as extra");
    }
    parsed
}

/// Integer value of a JSON number with no fractional part (`5` or `5.0`).
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn value_type(value: &Value) -> Option<ValueType> {
    value.as_str()?;
    serde_json::from_value(value.clone()).ok()
}
