//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use fortihook_config::ConfigError;
use fortihook_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the FortiGate: {reason}")]
    #[diagnostic(
        code(fortihook::connection_failed),
        help("Check `host` and `sshport` for this domain and that SSH admin access is enabled on the interface.")
    )]
    ConnectionFailed { reason: String },

    #[error("Host key for {host} was rejected: {reason}")]
    #[diagnostic(
        code(fortihook::host_key),
        help(
            "The key differs from the one recorded in ~/.ssh/known_hosts or from `host_key`.\n\
             If the firewall was replaced, remove the old entry and run again."
        )
    )]
    HostKeyRejected { host: String, reason: String },

    #[error("The FortiGate closed the session during `{step}`")]
    #[diagnostic(code(fortihook::channel_closed))]
    ChannelClosed { step: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fortihook::auth_failed),
        help(
            "Verify `username` and the password for this domain.\n\
             Store a new one with: fortihook config set-password <domain>"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for '{domain}'")]
    #[diagnostic(
        code(fortihook::no_credentials),
        help(
            "Set `password_env` or `password` under [domains.\"{domain}\"],\n\
             or run: fortihook config set-password {domain}"
        )
    )]
    NoCredentials { domain: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("No prompt from the FortiGate within {seconds}s during `{step}`")]
    #[diagnostic(
        code(fortihook::timeout),
        help(
            "Raise `timeout` for the domain, or set `prompt` if the device prompt\n\
             does not look like `hostname # `. Commands already sent stay applied."
        )
    )]
    Timeout { step: String, seconds: u64 },

    // ── Certificate files ────────────────────────────────────────────
    #[error("Cannot read {}", path.display())]
    #[diagnostic(code(fortihook::file))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid certificate: {message}")]
    #[diagnostic(code(fortihook::certificate))]
    Certificate { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fortihook::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(fortihook::config),
        help("Run `fortihook config path` to see which files are read.")
    )]
    Config(Box<figment::Error>),

    #[error("Keyring error: {reason}")]
    #[diagnostic(code(fortihook::keyring))]
    Keyring { reason: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(fortihook::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::HostKeyRejected { .. }
            | Self::ChannelClosed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Config(_) | Self::NoCredentials { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Connection { reason } => CliError::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::HostKeyRejected { host, reason } => {
                CliError::HostKeyRejected { host, reason }
            }
            CoreError::ProtocolTimeout { step, timeout } => CliError::Timeout {
                step,
                seconds: timeout.as_secs(),
            },
            CoreError::ChannelClosed { step } => CliError::ChannelClosed { step },
            CoreError::Io { path, source } => CliError::ReadFile { path, source },
            CoreError::Certificate { message } => CliError::Certificate { message },
            CoreError::PromptPattern { pattern, source } => CliError::Validation {
                field: "prompt".into(),
                reason: format!("'{pattern}': {source}"),
            },
            err @ CoreError::InvalidState { .. } => CliError::Internal(err.to_string()),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation {
                domain,
                field,
                reason,
            } => CliError::Validation {
                field: format!("{field} (domain '{domain}')"),
                reason,
            },
            ConfigError::NoCredentials { domain } => CliError::NoCredentials { domain },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Keyring(e) => CliError::Keyring {
                reason: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
        }
    }
}
