// ── Core error types ──
//
// Deploy-level errors from fortihook-core. Consumers never see russh
// errors directly; the `From<fortihook_ssh::Error>` impl translates
// transport failures into the variants below.
//
// A missing configuration record is deliberately NOT an error: it is the
// `DeployOutcome::NoConfiguration` value.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::session::SessionState;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("SSH connection failed: {reason}")]
    Connection { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Host key rejected for {host}: {reason}")]
    HostKeyRejected { host: String, reason: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Timed out after {}s waiting for the device during {step}", timeout.as_secs())]
    ProtocolTimeout { step: String, timeout: Duration },

    #[error("Device closed the session during {step}")]
    ChannelClosed { step: String },

    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid certificate: {message}")]
    Certificate { message: String },

    #[error("Invalid prompt pattern '{pattern}': {source}")]
    PromptPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

impl CoreError {
    /// Returns `true` for failures where the device did not answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ProtocolTimeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fortihook_ssh::Error> for CoreError {
    fn from(err: fortihook_ssh::Error) -> Self {
        match err {
            fortihook_ssh::Error::Authentication { username } => CoreError::AuthenticationFailed {
                message: format!("device rejected the password for user '{username}'"),
            },
            fortihook_ssh::Error::ConnectTimeout {
                host,
                port,
                timeout_secs,
            } => CoreError::ProtocolTimeout {
                step: format!("connect to {host}:{port}"),
                timeout: Duration::from_secs(timeout_secs),
            },
            fortihook_ssh::Error::HostKeyRejected { host, port, reason } => {
                CoreError::HostKeyRejected {
                    host: format!("{host}:{port}"),
                    reason,
                }
            }
            fortihook_ssh::Error::Ssh(e) => CoreError::Connection {
                reason: e.to_string(),
            },
            fortihook_ssh::Error::ChannelClosed => CoreError::ChannelClosed {
                step: "transport".into(),
            },
        }
    }
}
