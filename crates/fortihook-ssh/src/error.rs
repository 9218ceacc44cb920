use thiserror::Error;

/// Top-level error type for the `fortihook-ssh` crate.
///
/// Covers every failure mode of the shell transport: connection setup,
/// host key verification, authentication, and the open channel.
/// `fortihook-core` maps these into deploy-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The device rejected the supplied credentials.
    #[error("Authentication failed for user '{username}'")]
    Authentication { username: String },

    // ── Connection ──────────────────────────────────────────────────
    /// TCP connect or SSH handshake did not finish in time.
    #[error("Connection to {host}:{port} timed out after {timeout_secs}s")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout_secs: u64,
    },

    /// The server presented a host key that the configured policy refuses.
    #[error("Host key for {host}:{port} was rejected: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    /// Low-level SSH protocol or I/O error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    // ── Channel ─────────────────────────────────────────────────────
    /// The interactive shell channel is gone (EOF, close, or never opened).
    #[error("Shell channel closed by the remote side")]
    ChannelClosed,
}
