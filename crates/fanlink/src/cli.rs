//! Clap derive structures for the `fanlink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use fanlink_core::HistoryRange;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fanlink -- live view and control of a fan controller
#[derive(Debug, Parser)]
#[command(
    name = "fanlink",
    version,
    about = "Monitor and tune a fan controller from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "FANLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller base URL (overrides profile)
    #[arg(long, short = 'u', env = "FANLINK_URL", global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FANLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FANLINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FANLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current temperature, fan speed, power and control mode
    #[command(alias = "st")]
    Status,

    /// Show or change the fan curve
    Curve(CurveArgs),

    /// Show recorded samples for a time window
    History(HistoryArgs),

    /// Show controller logs
    Logs(LogsArgs),

    /// Follow live status and log pushes
    Watch(WatchArgs),

    /// Show or change controller settings
    Settings(SettingsArgs),

    /// Hand fan control back to the automatic curve
    RestoreAuto,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Curve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CurveArgs {
    #[command(subcommand)]
    pub command: CurveCommand,
}

#[derive(Debug, Subcommand)]
pub enum CurveCommand {
    /// Show the current fan curve
    Show,

    /// Replace the fan curve
    Set {
        /// Points as `temp:speed` pairs, comma separated (e.g. 30:20,70:100)
        points: String,
    },
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Time window: 1h, 6h, 24h or 7d
    #[arg(long, short = 'r', default_value = "1h")]
    pub range: HistoryRange,
}

// ── Logs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Only entries at this level (e.g. ERROR, WARNING, INFO)
    #[arg(long)]
    pub level: Option<String>,

    /// Only entries whose message contains this text
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Max entries (1-1000)
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub limit: Option<u32>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Do not print log pushes
    #[arg(long)]
    pub no_logs: bool,

    /// Exit after this many printed updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show controller settings
    Show,

    /// Change controller settings; unset flags are left as they are
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    /// BMC address
    #[arg(long)]
    pub ip_address: Option<String>,

    /// BMC username
    #[arg(long)]
    pub username: Option<String>,

    /// BMC password
    #[arg(long, env = "FANLINK_BMC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Polling interval in seconds
    #[arg(long)]
    pub interval: Option<u32>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration
    Show,

    /// Write a profile to the config file
    Init {
        /// Controller base URL
        url: String,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Path to a custom CA certificate
        #[arg(long)]
        ca_cert: Option<PathBuf>,

        /// Make this the default profile
        #[arg(long)]
        make_default: bool,
    },

    /// List configured profiles
    Profiles,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
