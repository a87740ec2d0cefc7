//! cooldownctl - command-line administration for the Cooldown Gate
//!
//! Operators use it to:
//! - check whether a user's action is cooling down
//! - record a use by hand, or clear one
//! - list everything a user has on cooldown
//!
//! Configuration layers built-in defaults, an optional TOML file and
//! `COOLDOWN_*` environment variables. The store is either in-memory (one
//! process, lost on exit) or PostgreSQL.

use std::ffi::OsString;
use std::sync::Arc;

use clap::builder::BoolishValueParser;
use clap::Parser;
use cooldown_gate::CooldownGate;
use cooldown_storage::memory::InMemoryCooldownStore;
use cooldown_storage::postgres::PostgresCooldownStore;
use cooldown_storage::CooldownStore;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod commands;
pub mod config;
mod error;
pub mod output;
pub mod progression;

use crate::commands::Command;
use crate::config::{CliConfig, StorageConfig};
use crate::output::OutputFormat;
use crate::progression::StaticProgression;

pub use error::{CliError, CliResult};

/// cooldownctl CLI
#[derive(Parser)]
#[command(name = "cooldownctl")]
#[command(about = "Inspect and administer per-user action cooldowns", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COOLDOWN_CONFIG")]
    config: Option<String>,

    /// Log level, overriding the configured one
    #[arg(long, env = "COOLDOWN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "COOLDOWN_LOG_JSON", value_parser = BoolishValueParser::new())]
    json: bool,

    /// Never reject; usage is still recorded. `DEV_MODE=1` and `DEV_MODE=true` both enable it
    #[arg(long, env = "DEV_MODE", value_parser = BoolishValueParser::new())]
    dev_mode: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

/// Run using the current process arguments.
pub async fn run() -> CliResult<String> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> CliResult<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.dev_mode {
        config.gate.dev_mode = true;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json;

    init_tracing(&config);
    debug!(storage = ?config.storage, dev_mode = config.gate.dev_mode, "Configuration loaded");

    match config.storage.clone() {
        StorageConfig::Memory => {
            let store = InMemoryCooldownStore::new();
            execute(Arc::new(store), &config, cli.command, cli.output).await
        }
        StorageConfig::Postgres {
            url,
            max_connections,
            connect_timeout_secs,
        } => {
            let store = PostgresCooldownStore::connect_with_options(
                &url,
                max_connections,
                connect_timeout_secs,
            )
            .await?;
            execute(Arc::new(store), &config, cli.command, cli.output).await
        }
    }
}

fn init_tracing(config: &CliConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    // Logs go to stderr so command output stays parseable.
    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn execute<S: CooldownStore>(
    store: Arc<S>,
    config: &CliConfig,
    command: Command,
    format: OutputFormat,
) -> CliResult<String> {
    let mut gate = CooldownGate::new(store, config.gate_config());
    let progression = StaticProgression::new(config.progression.reductions.clone());
    if !progression.is_empty() {
        gate = gate.with_progression(Arc::new(progression));
    }

    // Dropping the command future on Ctrl-C rolls back any open transaction.
    tokio::select! {
        result = commands::execute(&gate, command, format) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    }
}
