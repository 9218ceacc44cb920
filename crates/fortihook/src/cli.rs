//! Clap derive structures for the `fortihook` CLI.
//!
//! dehydrated calls hooks as `fortihook <event> <args...>`; every event name
//! that is not one of the subcommands below lands in [`Command::Hook`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fortihook -- dehydrated hook for FortiGate certificate deployment
#[derive(Debug, Parser)]
#[command(
    name = "fortihook",
    version,
    about = "Deploy dehydrated certificates to FortiGate firewalls",
    long_about = "Installs Let's Encrypt certificates issued by dehydrated on FortiGate\n\
        firewalls over SSH, and optionally binds them to the admin GUI, the\n\
        SSL-VPN portal and the wireless controller.\n\n\
        As a dehydrated hook:  fortihook <event> <domain> <key> <cert> <fullchain> <chain>\n\
        Only deploy_cert and unchanged_cert do anything; other events are ignored.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to read (repeatable; later files override earlier ones).
    /// Without this flag the standard search list is used.
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    pub config: Vec<PathBuf>,

    /// Output format for reports
    #[arg(
        long,
        short = 'o',
        env = "FORTIHOOK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one record per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy certificates by hand
    Deploy(DeployArgs),

    /// Inspect configuration and manage stored passwords
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// dehydrated hook event (deploy_cert, unchanged_cert, ...)
    #[command(external_subcommand)]
    Hook(Vec<String>),
}

// ── Deploy ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Certificate domain (repeatable; paired with --key and --cert by position)
    #[arg(long, short = 'd', required = true)]
    pub domain: Vec<String>,

    /// Private key file (PEM)
    #[arg(long, short = 'k', required = true)]
    pub key: Vec<PathBuf>,

    /// Certificate file (PEM)
    #[arg(long, required = true)]
    pub cert: Vec<PathBuf>,

    /// Log in and report what would change, without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the merged configuration (passwords masked)
    Show,

    /// List the config files that are read, in order
    Path,

    /// Store a device password in the system keyring
    SetPassword {
        /// Domain whose FortiGate password to store
        domain: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
