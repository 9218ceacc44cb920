// ── Runtime configuration types ──
//
// These types describe a resolved deploy target. They are constructed by
// the CLI from on-disk config (fortihook-config) and handed to the
// deploy orchestration. Core never reads config files itself.

use std::time::Duration;

use fortihook_ssh::{ConnectParams, HostKeyPolicy};
use secrecy::SecretString;

use crate::session::PromptMatcher;

/// Default per-wait command timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on TCP connect, handshake and authentication.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// How to reach and log in to a FortiGate.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub prompt: PromptMatcher,
    pub host_key: HostKeyPolicy,
    /// Bound on every prompt wait.
    pub command_timeout: Duration,
    pub connect_timeout: Duration,
}

impl DeviceEndpoint {
    /// Endpoint with the stock FortiGate prompt and default timeouts.
    pub fn new(host: impl Into<String>, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            username: username.into(),
            password,
            prompt: PromptMatcher::fortigate(),
            host_key: HostKeyPolicy::default(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Transport parameters for opening the shell.
    pub fn connect_params(&self) -> ConnectParams {
        ConnectParams {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            host_key: self.host_key.clone(),
            connect_timeout: self.connect_timeout,
        }
    }
}

/// Which services should present the certificate after install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub domain: String,
    pub wifi: bool,
    pub vpn: bool,
    pub admin: bool,
}

/// Everything the config file says about one domain.
#[derive(Debug, Clone)]
pub struct DomainRecord {
    pub endpoint: DeviceEndpoint,
    pub target: DeploymentTarget,
}
