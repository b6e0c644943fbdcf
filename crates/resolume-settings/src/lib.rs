//! # resolume-settings
//!
//! Client configuration loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ClientSettings::default()`]
//! 2. **User file**: `~/.resolume-client/settings.json` (merged over defaults)
//! 3. **Environment variables**: `RESOLUME_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! let settings = resolume_settings::load_settings().unwrap_or_default();
//! println!("REST API at {}", settings.connection.rest_base_url());
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, merge_over, settings_path};
pub use types::*;
