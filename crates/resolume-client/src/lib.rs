//! # resolume-client
//!
//! Typed client for the Resolume control API over its two transports:
//!
//! - [`ResolumeApi`]: one-shot REST requests against `http(s)://host:port/api/v1`
//!   (fetch the composition, replace layers and clips, open media)
//! - [`SubscriptionChannel`]: one long-lived WebSocket to `ws(s)://host:port/api/v1`
//!   that multiplexes parameter, composition and error listeners
//!
//! The two share no state. A caller that changes something over REST and
//! wants to observe the result subscribes to the affected parameter on the
//! channel itself.

#![deny(unsafe_code)]

pub mod encoding;
pub mod errors;
pub mod rest;
pub mod ws;

pub use encoding::ClipEncoding;
pub use errors::{ApiError, ChannelError, OpenClipError};
pub use rest::ResolumeApi;
pub use ws::{ChannelState, ListenerId, SubscriptionChannel};
