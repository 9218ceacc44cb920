// Transport seams for the interactive shell.
//
// The session engine only needs a character pipe: write text, read the
// next chunk of output. `Connector` opens such a pipe from connection
// parameters. The russh implementation lives in `client.rs`; tests
// substitute in-memory devices.

use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::Error;

/// Host key verification policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept unknown hosts and record them in `~/.ssh/known_hosts`;
    /// refuse hosts whose recorded key changed.
    #[default]
    AcceptNew,
    /// Only accept hosts already present in `~/.ssh/known_hosts`.
    KnownHosts,
    /// Accept exactly this base64-encoded public key.
    PublicKey(String),
    /// Accept any key.
    DangerAcceptAny,
}

impl HostKeyPolicy {
    /// Parse the config file spelling: `accept-new`, `known-hosts`, `none`,
    /// or a base64 public key.
    pub fn from_config(value: &str) -> Self {
        match value {
            "accept-new" => Self::AcceptNew,
            "known-hosts" => Self::KnownHosts,
            "none" => Self::DangerAcceptAny,
            key => Self::PublicKey(key.to_owned()),
        }
    }
}

/// Everything needed to open an authenticated shell on a device.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub host_key: HostKeyPolicy,
    /// Bound on TCP connect + handshake + authentication.
    pub connect_timeout: Duration,
}

/// A bidirectional character stream to a remote shell.
///
/// Implementations are owned by exactly one session and are never shared.
pub trait Transport: Send {
    /// Write raw text to the shell. No terminator is appended.
    fn send(&mut self, data: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Wait for the next chunk of output. `Ok(None)` means the remote side
    /// closed the stream.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Tear the stream down.
    fn close(&mut self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Opens authenticated transports.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(
        &self,
        params: &ConnectParams,
    ) -> impl Future<Output = Result<Self::Transport, Error>> + Send;
}
