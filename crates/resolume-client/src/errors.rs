//! Client error types.
//!
//! Only opening a clip classifies failures locally ([`OpenClipError`]).
//! Every other REST call hands back the transport or decode error as-is,
//! and a non-2xx response to a mutation is returned to the caller rather
//! than turned into an error.

use thiserror::Error;

/// Errors from REST calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or body transfer failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Opening a clip failed.
    #[error(transparent)]
    OpenClip(#[from] OpenClipError),

    /// The object passed in lacks a field needed to build the request.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Why opening a clip failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenClipError {
    /// No response before the open timer fired.
    #[error("error opening clip: timeout after {timeout_ms}ms")]
    Timeout {
        /// How long we waited.
        timeout_ms: u64,
    },

    /// The request went out but the server closed the connection without
    /// answering.
    #[error("error opening clip: response not received")]
    NoResponse,

    /// The server answered with a status of 300 or above.
    #[error("error opening clip: {status_text}")]
    BadStatus {
        /// Numeric status code.
        status: u16,
        /// Reason phrase of the status.
        status_text: String,
    },
}

/// Errors from the WebSocket channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Opening the WebSocket failed.
    #[error("WebSocket connect failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    /// An action could not be serialized.
    #[error("failed to encode action: {0}")]
    Encode(#[from] serde_json::Error),

    /// The channel is closed; nothing more can be sent.
    #[error("channel is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display() {
        let err = OpenClipError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "error opening clip: timeout after 5000ms");
    }

    #[test]
    fn bad_status_display_carries_status_text() {
        let err = OpenClipError::BadStatus {
            status: 404,
            status_text: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "error opening clip: Not Found");
    }

    #[test]
    fn open_clip_error_is_transparent_in_api_error() {
        let err: ApiError = OpenClipError::NoResponse.into();
        assert_eq!(err.to_string(), "error opening clip: response not received");
        assert!(matches!(err, ApiError::OpenClip(OpenClipError::NoResponse)));
    }

    #[test]
    fn decode_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(err.to_string().contains("decode response body"));
    }

    #[test]
    fn closed_display() {
        assert_eq!(ChannelError::Closed.to_string(), "channel is closed");
    }
}
