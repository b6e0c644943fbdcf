//! # resolume-core
//!
//! Protocol vocabulary shared by the Resolume REST and WebSocket clients.
//!
//! - **Parameter identity**: [`ParameterRef`] (numeric id or path) normalized
//!   into a canonical [`ParameterKey`]
//! - **Outbound actions**: [`Action`] tagged by its `action` field
//! - **Inbound messages**: [`InboundMessage`] classified from raw frames
//! - **Schema**: opaque JSON-object newtypes for composition objects
//! - **Logging**: [`logging::init_subscriber`] for binaries and tests

#![deny(unsafe_code)]

pub mod action;
pub mod catalogue;
pub mod constants;
pub mod logging;
pub mod message;
pub mod parameter;
pub mod schema;

pub use action::{Action, ActionType};
pub use catalogue::{Effect, EffectPreset, EffectsCatalogue};
pub use message::{ErrorMessage, InboundMessage, ParameterEvent, ParameterMessage, ValueType};
pub use parameter::{ParameterKey, ParameterRef};
pub use schema::{Clip, Column, Composition, Deck, Layer, ProductInfo, Sources, VideoEffect};
