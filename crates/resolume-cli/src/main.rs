//! # resolume
//!
//! Command-line driver for a running Resolume instance: one-shot REST calls,
//! parameter actions over the WebSocket, and a `watch` mode that prints
//! inbound frames until Ctrl-C.

#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{info, warn};

use resolume_client::{ChannelError, ClipEncoding, ResolumeApi, SubscriptionChannel};
use resolume_core::ParameterRef;
use resolume_settings::ClientSettings;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolume control API client.
#[derive(Parser, Debug)]
#[command(name = "resolume", about = "Drive a Resolume instance over its control API")]
struct Cli {
    /// Server host (overrides settings).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port (overrides settings).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Log filter, e.g. `info` or `resolume_client=debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print product name and version.
    Product,
    /// Print the current composition.
    Composition,
    /// Append a column.
    AddColumn,
    /// Append a layer.
    AddLayer,
    /// Print one clip.
    Clip {
        /// Layer index (1-based).
        layer: u32,
        /// Clip index (1-based).
        clip: u32,
    },
    /// Open a media file into a clip slot.
    OpenClip {
        /// Layer index (1-based).
        layer: u32,
        /// Clip index (1-based).
        clip: u32,
        /// Media path; relative paths resolve against the media root.
        path: String,
        /// How the path is sent.
        #[arg(long, default_value_t = ClipEncoding::File)]
        encoding: ClipEncoding,
    },
    /// Add a video effect to a clip by name.
    AddEffect {
        /// Layer index (1-based).
        layer: u32,
        /// Clip index (1-based).
        clip: u32,
        /// Effect display name.
        name: String,
    },
    /// Load a video source into a clip by name.
    AddSource {
        /// Layer index (1-based).
        layer: u32,
        /// Clip index (1-based).
        clip: u32,
        /// Source display name.
        name: String,
    },
    /// Print inbound frames until Ctrl-C.
    ///
    /// With no flags, prints the composition and then every new snapshot.
    Watch {
        /// Parameter id or path to subscribe to (repeatable).
        #[arg(long = "param")]
        params: Vec<String>,
        /// Print composition snapshots.
        #[arg(long)]
        composition: bool,
        /// Print every parameter message.
        #[arg(long)]
        all: bool,
    },
    /// Set a parameter value. The value is parsed as JSON, falling back to a string.
    Set {
        /// Parameter id or path.
        parameter: String,
        /// New value.
        value: String,
    },
    /// Fire a trigger parameter.
    Trigger {
        /// Parameter id or path.
        parameter: String,
        /// Pressed state to send with the trigger.
        #[arg(long)]
        pressed: Option<bool>,
    },
}

// ─── Argument helpers ───────────────────────────────────────────────────

/// A bare integer is a parameter id; anything else is a path.
fn parse_parameter(raw: &str) -> ParameterRef {
    raw.parse::<i64>()
        .map_or_else(|_| ParameterRef::from(raw), ParameterRef::Id)
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn apply_overrides(settings: &mut ClientSettings, cli: &Cli) {
    if let Some(ref host) = cli.host {
        settings.connection.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        settings.connection.port = port;
    }
    if let Some(ref level) = cli.log_level {
        settings.logging.level.clone_from(level);
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(response: &reqwest::Response) {
    let status = response.status();
    println!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
}

fn print_line(value: &impl serde::Serialize) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "failed to print frame"),
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let api = ResolumeApi::from_settings(settings);
    match command {
        Command::Product => {
            let product = api.product().await.context("fetching product info")?;
            print_json(&product)?;
        }
        Command::Composition => {
            let composition = api.composition().await.context("fetching composition")?;
            print_json(&composition)?;
        }
        Command::AddColumn => print_status(&api.add_column().await?),
        Command::AddLayer => print_status(&api.add_layer().await?),
        Command::Clip { layer, clip } => {
            let clip = api.clip_by_index(layer, clip).await.context("fetching clip")?;
            print_json(&clip)?;
        }
        Command::OpenClip {
            layer,
            clip,
            path,
            encoding,
        } => {
            let path = api.resolve_media_path(&path);
            api.open_clip_by_index(layer, clip, &path, encoding).await?;
            info!(layer, clip, path = %path, "clip opened");
        }
        Command::AddEffect { layer, clip, name } => {
            print_status(&api.add_video_effect(layer, clip, &name).await?);
        }
        Command::AddSource { layer, clip, name } => {
            print_status(&api.add_video_source(layer, clip, &name).await?);
        }
        Command::Watch {
            params,
            composition,
            all,
        } => watch(&api, settings, &params, composition, all).await?,
        Command::Set { parameter, value } => {
            let parameter = parse_parameter(&parameter);
            let value = parse_value(&value);
            send_once(settings, |channel| channel.set_parameter(parameter, value)).await?;
        }
        Command::Trigger { parameter, pressed } => {
            let parameter = parse_parameter(&parameter);
            send_once(settings, |channel| channel.trigger(parameter, pressed)).await?;
        }
    }
    Ok(())
}

/// Connect, send one action, and close once it has been written.
async fn send_once(
    settings: &ClientSettings,
    send: impl FnOnce(&SubscriptionChannel) -> std::result::Result<(), ChannelError>,
) -> Result<()> {
    let channel = SubscriptionChannel::connect(&settings.connection)
        .await
        .context("connecting to WebSocket")?;
    send(&channel)?;
    channel.close();
    tokio::time::timeout(CLOSE_TIMEOUT, channel.closed())
        .await
        .context("timed out closing WebSocket")?;
    Ok(())
}

async fn watch(
    api: &ResolumeApi,
    settings: &ClientSettings,
    params: &[String],
    composition: bool,
    all: bool,
) -> Result<()> {
    let demo = params.is_empty() && !composition && !all;
    if demo {
        let snapshot = api.composition().await.context("fetching composition")?;
        print_json(&snapshot)?;
    }

    let channel = SubscriptionChannel::connect(&settings.connection)
        .await
        .context("connecting to WebSocket")?;

    if demo || composition {
        channel.on_composition(|snapshot| print_line(snapshot));
    }
    if all {
        channel.on_all(|msg| print_line(msg));
    }
    for raw in params {
        let _ = channel.on_parameter(parse_parameter(raw), |msg| print_line(msg));
    }
    channel.on_error(|err| warn!(error = ?err.error, path = ?err.path, "server error"));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for Ctrl-C")?;
            info!("interrupted, closing");
            channel.close();
            let _ = tokio::time::timeout(CLOSE_TIMEOUT, channel.closed()).await;
        }
        () = channel.closed() => {
            warn!("server closed the connection");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = resolume_settings::load_settings().unwrap_or_default();
    apply_overrides(&mut settings, &cli);

    match cli.log_format {
        LogFormat::Text => resolume_core::logging::init_subscriber(&settings.logging.level),
        LogFormat::Json => resolume_core::logging::init_json_subscriber(&settings.logging.level),
    }

    run(cli.command, &settings).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["resolume", "product"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.command, Command::Product);
    }

    #[test]
    fn cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "resolume",
            "composition",
            "--host",
            "10.0.0.5",
            "--port",
            "8090",
            "--log-format",
            "json",
        ]);
        assert_eq!(cli.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.port, Some(8090));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_open_clip_default_encoding() {
        let cli = Cli::parse_from(["resolume", "open-clip", "1", "2", "loops/a.mov"]);
        assert_eq!(
            cli.command,
            Command::OpenClip {
                layer: 1,
                clip: 2,
                path: "loops/a.mov".into(),
                encoding: ClipEncoding::File,
            }
        );
    }

    #[test]
    fn cli_open_clip_encoding_flag() {
        let cli = Cli::parse_from(["resolume", "open-clip", "1", "2", "x", "--encoding", "raw"]);
        assert!(matches!(
            cli.command,
            Command::OpenClip {
                encoding: ClipEncoding::Raw,
                ..
            }
        ));
    }

    #[test]
    fn cli_rejects_unknown_encoding() {
        let result =
            Cli::try_parse_from(["resolume", "open-clip", "1", "2", "x", "--encoding", "zip"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_watch_flags() {
        let cli = Cli::parse_from([
            "resolume",
            "watch",
            "--param",
            "5",
            "--param",
            "/composition/master",
            "--all",
        ]);
        assert_eq!(
            cli.command,
            Command::Watch {
                params: vec!["5".into(), "/composition/master".into()],
                composition: false,
                all: true,
            }
        );
    }

    #[test]
    fn cli_trigger_pressed() {
        let cli = Cli::parse_from(["resolume", "trigger", "12", "--pressed", "true"]);
        assert_eq!(
            cli.command,
            Command::Trigger {
                parameter: "12".into(),
                pressed: Some(true),
            }
        );
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["resolume"]).is_err());
    }

    #[test]
    fn parse_parameter_id_or_path() {
        assert_eq!(parse_parameter("42"), ParameterRef::Id(42));
        assert_eq!(
            parse_parameter("/composition/master"),
            ParameterRef::Path("/composition/master".into())
        );
    }

    #[test]
    fn parse_value_json_or_string() {
        assert_eq!(parse_value("0.5"), serde_json::json!(0.5));
        assert_eq!(parse_value("true"), serde_json::json!(true));
        assert_eq!(parse_value("{\"r\":1}"), serde_json::json!({"r": 1}));
        assert_eq!(parse_value("hello"), serde_json::json!("hello"));
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::parse_from([
            "resolume",
            "product",
            "--host",
            "studio.local",
            "--port",
            "9000",
            "--log-level",
            "debug",
        ]);
        let mut settings = ClientSettings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.connection.host, "studio.local");
        assert_eq!(settings.connection.port, 9000);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn no_overrides_keep_settings() {
        let cli = Cli::parse_from(["resolume", "product"]);
        let mut settings = ClientSettings::default();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings, ClientSettings::default());
    }
}
