//! Tracing subscriber setup.
//!
//! The library crates only emit `tracing` events; binaries call
//! [`init_subscriber`] once at startup to print them.

use tracing_subscriber::EnvFilter;

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Compact human-readable events on stderr.
///
/// `RUST_LOG` wins over `level` when set. Only the first call in a process
/// installs a subscriber.
pub fn init_subscriber(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// One JSON object per event on stderr, for `--log-format json`.
pub fn init_json_subscriber(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .json()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        init_subscriber("warn");
        init_subscriber("debug");
        init_json_subscriber("info");
    }
}
