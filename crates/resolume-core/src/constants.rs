//! Protocol constants for the Resolume control API.

use std::time::Duration;

/// Path prefix shared by the REST and WebSocket endpoints.
pub const API_PATH: &str = "/api/v1";

/// Path template prefix for parameters addressed by numeric id.
pub const PARAMETER_BY_ID_PREFIX: &str = "/parameter/by-id/";

/// How long opening a clip may take before it is reported as timed out.
pub const OPEN_CLIP_TIMEOUT: Duration = Duration::from_millis(5000);

/// URI scheme prefix for video effects added to a clip.
pub const VIDEO_EFFECT_URI: &str = "effect:///video/";

/// URI scheme prefix for video sources opened into a clip.
pub const VIDEO_SOURCE_URI: &str = "source:///video/";
