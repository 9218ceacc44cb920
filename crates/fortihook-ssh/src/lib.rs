// fortihook-ssh: interactive SSH shell transport for FortiGate appliances

pub mod client;
pub mod error;
pub mod transport;

pub use client::{SshConnector, SshShell};
pub use error::Error;
pub use transport::{ConnectParams, Connector, HostKeyPolicy, Transport};
