//! Certificate deployment engine for FortiGate appliances.
//!
//! FortiGates expose no structured API over SSH, only the human-oriented
//! FortiOS CLI. This crate drives that CLI the way an operator would:
//!
//! - **[`InteractiveSession`]**: owns one login. Sends a line, waits for the
//!   prompt ([`PromptMatcher`]), follows `--More--` pagination
//!   ([`PagingReader`]), and enforces a single-use state machine.
//!
//! - **[`CertificateInventory`]**: parses the `config vpn certificate local`
//!   listing into the set of installed certificate names.
//!
//! - **[`DeploymentPlanner`]**: decides install-or-skip for a
//!   [`CertificateDescriptor`] and which services to bind afterwards.
//!
//! - **[`CommandSequencer`]**: runs the install and binding
//!   [`CommandBlock`]s line by line.
//!
//! - **[`deploy()`]**: the whole protocol for one domain, returning a
//!   [`DeployOutcome`].
//!
//! The shell itself comes from [`fortihook_ssh`]; anything implementing its
//! `Connector` trait can stand in for a real device.

pub mod certificate;
pub mod command;
pub mod config;
pub mod deploy;
pub mod error;
pub mod inventory;
pub mod planner;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use certificate::CertificateDescriptor;
pub use command::{CommandBlock, CommandLine, CommandSequencer};
pub use config::{DeploymentTarget, DeviceEndpoint, DomainRecord};
pub use deploy::{DeployMode, DeployOutcome, DeployRequest, deploy};
pub use error::CoreError;
pub use inventory::CertificateInventory;
pub use planner::{Binding, Decision, DeploymentPlan, DeploymentPlanner};
pub use session::{InteractiveSession, PagedOutput, PagingReader, PromptMatcher, SessionState};

pub use fortihook_ssh::{ConnectParams, Connector, HostKeyPolicy, Transport};
