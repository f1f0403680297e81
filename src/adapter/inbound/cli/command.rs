//! Command-line interface definitions.
//!
//! Defines the CLI structure for keygrab using `clap`: the foreground `run`
//! command plus a few one-shot helpers for inspecting tasks, searching the
//! catalog and validating configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Game-key price watcher and auto-buyer
#[derive(Parser, Debug)]
#[command(name = "keygrab")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands for the keygrab CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch tracked items and buy when their price policy is met (foreground, interactive)
    Run(RunArgs),

    /// List saved tasks
    Tasks(TasksArgs),

    /// Search the marketplace catalog
    Search(SearchArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `keygrab check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file syntax and semantics.
    Config(ConfigPathArg),
}

/// Config file path argument shared by subcommands.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,

    /// Polling interval in seconds (clamped to 1-60).
    #[arg(long)]
    pub interval: Option<u64>,

    /// Default percentage for new tasks (clamped to 10-100).
    #[arg(long)]
    pub percentage: Option<i64>,

    /// Task file to load and save.
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Keep tasks in memory only.
    #[arg(long, conflicts_with = "store")]
    pub ephemeral: bool,
}

/// Arguments for the `tasks` subcommand.
#[derive(Parser, Debug)]
pub struct TasksArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Task file to read instead of the configured one.
    #[arg(long)]
    pub store: Option<PathBuf>,
}

/// Arguments for the `search` subcommand.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Game name or part of it.
    #[arg(required = true, num_args = 1..)]
    pub keyword: Vec<String>,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}
