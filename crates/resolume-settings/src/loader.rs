//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ClientSettings::default()`]
//! 2. If `~/.resolume-client/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{ClientSettings, HttpScheme, WsScheme};

/// Resolve the path to the settings file (`~/.resolume-client/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".resolume-client")
        .join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ClientSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON or an unusable value, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ClientSettings> {
    let mut merged = serde_json::to_value(ClientSettings::default())?;

    if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        merge_over(&mut merged, user);
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    let mut settings: ClientSettings = serde_json::from_value(merged)?;
    validate(&settings)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn validate(settings: &ClientSettings) -> Result<()> {
    if settings.connection.port == 0 {
        return Err(SettingsError::InvalidValue(
            "connection.port must be between 1 and 65535".into(),
        ));
    }
    if settings.connection.host.trim().is_empty() {
        return Err(SettingsError::InvalidValue(
            "connection.host must not be empty".into(),
        ));
    }
    Ok(())
}

/// Lay user settings over `base` in place.
///
/// Nested objects merge key by key, so a file holding only
/// `{"connection": {"port": 9090}}` keeps the default host. A `null` leaves
/// the base value alone. Anything else replaces it.
pub fn merge_over(base: &mut Value, user: Value) {
    let Value::Object(user_map) = user else {
        *base = user;
        return;
    };
    let Value::Object(base_map) = base else {
        *base = Value::Object(user_map);
        return;
    };
    for (key, value) in user_map.into_iter().filter(|(_, v)| !v.is_null()) {
        match base_map.get_mut(&key) {
            Some(slot) => merge_over(slot, value),
            None => {
                let _ = base_map.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut ClientSettings) {
    if let Some(v) = read_env_string("RESOLUME_HOST") {
        settings.connection.host = v;
    }
    if let Some(v) = read_env_u16("RESOLUME_PORT", 1, 65535) {
        settings.connection.port = v;
    }
    if let Some(v) = read_env_parsed::<HttpScheme>("RESOLUME_HTTP_SCHEME") {
        settings.connection.http_scheme = v;
    }
    if let Some(v) = read_env_parsed::<WsScheme>("RESOLUME_WS_SCHEME") {
        settings.connection.ws_scheme = v;
    }
    if let Some(v) = read_env_string("RESOLUME_MEDIA_ROOT") {
        settings.media_root = Some(PathBuf::from(v));
    }
    if let Some(v) = read_env_string("RESOLUME_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_parsed<T: std::str::FromStr<Err = String>>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(key = name, value = %val, error = %e, "invalid env var, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── merge_over ──────────────────────────────────────────────────

    #[test]
    fn user_port_keeps_default_host() {
        let mut base = serde_json::to_value(ClientSettings::default()).unwrap();
        merge_over(&mut base, serde_json::json!({"connection": {"port": 9090}}));
        assert_eq!(base["connection"]["port"], 9090);
        assert_eq!(base["connection"]["host"], "127.0.0.1");
        assert_eq!(base["connection"]["httpScheme"], "http");
    }

    #[test]
    fn null_media_root_keeps_default() {
        let mut base = serde_json::to_value(ClientSettings::default()).unwrap();
        let before = base.clone();
        merge_over(
            &mut base,
            serde_json::json!({"mediaRoot": null, "logging": {"level": null}}),
        );
        assert_eq!(base, before);
    }

    #[test]
    fn media_root_is_added_when_default_omits_it() {
        let mut base = serde_json::to_value(ClientSettings::default()).unwrap();
        merge_over(&mut base, serde_json::json!({"mediaRoot": "/clips"}));
        assert_eq!(base["mediaRoot"], "/clips");
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/settings.json");
        let settings = load_settings_from_path(path).unwrap();
        let defaults = ClientSettings::default();
        assert_eq!(settings.connection.port, defaults.connection.port);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"connection": {"host": "192.168.1.20", "wsScheme": "wss"}, "mediaRoot": "/media/clips"}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.connection.host, "192.168.1.20");
        assert_eq!(settings.connection.ws_scheme, WsScheme::Wss);
        assert_eq!(settings.connection.port, 8080);
        assert_eq!(settings.media_root, Some(PathBuf::from("/media/clips")));
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_unknown_scheme_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"connection": {"httpScheme": "gopher"}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_zero_port_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"connection": {"port": 0}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::InvalidValue(_)));
    }

    #[test]
    fn load_empty_host_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"connection": {"host": "  "}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::InvalidValue(_)));
    }

    // ── parse_u16_range ─────────────────────────────────────────────

    #[test]
    fn parse_u16_valid() {
        assert_eq!(parse_u16_range("9090", 1, 65535), Some(9090));
        assert_eq!(parse_u16_range("65535", 1, 65535), Some(65535));
    }

    #[test]
    fn parse_u16_invalid() {
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("99999", 1, 65535), None);
        assert_eq!(parse_u16_range("port", 1, 65535), None);
    }
}
