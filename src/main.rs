#![forbid(unsafe_code)]

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{Level as TraceLevel, error};
use tracing_subscriber::FmtSubscriber;

use fastwq_config::constants::defaults;
use fastwq_config::{ConfigPaths, FixedProfile, Settings, SettingsStore};

/// Inspect and edit the FastWQ settings file
#[derive(Debug, Parser)]
#[command(name = "fastwq-config", version)]
struct Cli {
    /// Directory holding the settings file (defaults to $FASTWQ_HOME or the home directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Host profile whose last-model key is read and written
    #[arg(long, default_value = defaults::PROFILE)]
    profile: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current and legacy file locations
    Paths,
    /// Print the effective settings, defaults included
    Show,
    /// Print the raw stored value of a key
    Get { key: String },
    /// Store a value (parsed as JSON, otherwise taken as a string)
    Set { key: String, value: String },
    /// Print the field maps configured for a card model
    Fields { model_id: i64 },
}

/// Settings as seen by one profile
#[derive(Serialize)]
struct EffectiveSettings<'a> {
    profile: &'a str,
    last_model_id: i64,
    #[serde(flatten)]
    settings: &'a Settings,
}

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    };

    // stdout carries command output, logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;
    Ok(())
}

/// CLI values are JSON when they parse as JSON, plain strings otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn resolve_paths(dir: Option<PathBuf>) -> Result<ConfigPaths> {
    match dir {
        Some(dir) => Ok(ConfigPaths::in_dir(dir)),
        None => ConfigPaths::detect().context("Failed to locate settings directory"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let paths = resolve_paths(cli.dir)?;

    if let Command::Paths = cli.command {
        for (label, path) in [("current", &paths.current), ("legacy", &paths.legacy)] {
            let state = if path.exists() { "exists" } else { "missing" };
            println!("{label}: {} ({state})", path.display());
        }
        return Ok(());
    }

    let mut store = SettingsStore::with_paths(paths, FixedProfile::new(cli.profile.clone()))
        .with_context(|| format!("Failed to open settings for profile '{}'", cli.profile))?;

    match cli.command {
        Command::Paths => unreachable!("handled before opening the store"),
        Command::Show => print_json(&EffectiveSettings {
            profile: &cli.profile,
            last_model_id: store.last_model_id(),
            settings: store.settings(),
        })?,
        Command::Get { key } => match store.document().get(&key) {
            Some(value) => print_json(value)?,
            None => bail!("Key '{key}' is not set"),
        },
        Command::Set { key, value } => {
            store
                .set(key.clone(), parse_value(&value))
                .with_context(|| format!("Failed to save '{key}' to {}", store.paths().current.display()))?;
        }
        Command::Fields { model_id } => print_json(&store.fields_for_model(model_id))?,
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    run(cli).inspect_err(|err| error!("fastwq-config failed: err={err:#}"))
}
