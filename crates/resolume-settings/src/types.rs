//! Settings types.
//!
//! All structs use `camelCase` on disk and `#[serde(default)]` so a partial
//! file only overrides what it names.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use resolume_core::constants::API_PATH;
use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientSettings {
    /// Where the product's web server listens.
    pub connection: ConnectionSettings,
    /// Local directory that relative clip paths are resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_root: Option<PathBuf>,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Scheme used for REST requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpScheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

/// Scheme used for the WebSocket connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WsScheme {
    /// Plain WebSocket.
    #[default]
    Ws,
    /// WebSocket over TLS.
    Wss,
}

impl HttpScheme {
    /// Scheme as it appears in a URL.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl WsScheme {
    /// Scheme as it appears in a URL.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

impl FromStr for HttpScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("unknown HTTP scheme '{other}'")),
        }
    }
}

impl FromStr for WsScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ws" => Ok(Self::Ws),
            "wss" => Ok(Self::Wss),
            other => Err(format!("unknown WebSocket scheme '{other}'")),
        }
    }
}

impl fmt::Display for HttpScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WsScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host, port and schemes of the product's web server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Host name or IP address.
    pub host: String,
    /// TCP port of the web server (REST and WebSocket share it).
    pub port: u16,
    /// Scheme for REST calls.
    pub http_scheme: HttpScheme,
    /// Scheme for the WebSocket.
    pub ws_scheme: WsScheme,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            http_scheme: HttpScheme::Http,
            ws_scheme: WsScheme::Ws,
        }
    }
}

impl ConnectionSettings {
    /// Plain-scheme settings for `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `http(s)://host:port/api/v1`
    #[must_use]
    pub fn rest_base_url(&self) -> String {
        format!("{}://{}:{}{API_PATH}", self.http_scheme, self.host, self.port)
    }

    /// `ws(s)://host:port/api/v1`
    #[must_use]
    pub fn ws_base_url(&self) -> String {
        format!("{}://{}:{}{API_PATH}", self.ws_scheme, self.host, self.port)
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls() {
        let conn = ConnectionSettings::new("10.0.0.5", 8090);
        assert_eq!(conn.rest_base_url(), "http://10.0.0.5:8090/api/v1");
        assert_eq!(conn.ws_base_url(), "ws://10.0.0.5:8090/api/v1");
    }

    #[test]
    fn secure_base_urls() {
        let conn = ConnectionSettings {
            http_scheme: HttpScheme::Https,
            ws_scheme: WsScheme::Wss,
            ..ConnectionSettings::new("arena.local", 443)
        };
        assert_eq!(conn.rest_base_url(), "https://arena.local:443/api/v1");
        assert_eq!(conn.ws_base_url(), "wss://arena.local:443/api/v1");
    }

    #[test]
    fn scheme_parsing() {
        assert_eq!("HTTPS".parse::<HttpScheme>(), Ok(HttpScheme::Https));
        assert_eq!("wss".parse::<WsScheme>(), Ok(WsScheme::Wss));
        assert!("ftp".parse::<HttpScheme>().is_err());
        assert!("http".parse::<WsScheme>().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ClientSettings::default()).unwrap();
        assert_eq!(json["connection"]["httpScheme"], "http");
        assert_eq!(json["connection"]["wsScheme"], "ws");
        assert!(json.get("mediaRoot").is_none());
    }
}
