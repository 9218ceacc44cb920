// ── Deploy orchestration ──
//
// One deploy = one login: list, decide, install, bind, log out. A missing
// configuration record is a successful no-op, reported as
// `DeployOutcome::NoConfiguration`.

use std::path::PathBuf;

use fortihook_ssh::{Connector, Transport};
use serde::Serialize;
use tracing::info;

use crate::certificate::CertificateDescriptor;
use crate::command::CommandSequencer;
use crate::config::{DeploymentTarget, DomainRecord};
use crate::error::CoreError;
use crate::planner::{Binding, Decision, DeploymentPlan, DeploymentPlanner};
use crate::session::InteractiveSession;

/// Whether to change the device or only report the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployMode {
    #[default]
    Apply,
    /// Log in, read the inventory, plan, log out. Nothing is changed.
    DryRun,
}

/// Certificate files for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub domain: String,
    pub key_file: PathBuf,
    pub cert_file: PathBuf,
}

/// What a deploy did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DeployOutcome {
    /// No record for the domain; nothing was read or contacted.
    NoConfiguration { domain: String },
    AlreadyInstalled {
        domain: String,
        certificate_name: String,
    },
    Installed {
        domain: String,
        certificate_name: String,
        bindings: Vec<Binding>,
    },
    /// Dry run result.
    Planned(DeploymentPlan),
}

impl DeployOutcome {
    pub fn domain(&self) -> &str {
        match self {
            Self::NoConfiguration { domain }
            | Self::AlreadyInstalled { domain, .. }
            | Self::Installed { domain, .. } => domain,
            Self::Planned(plan) => &plan.domain,
        }
    }
}

/// Deploy one certificate to the device configured for its domain.
///
/// Errors abort the deploy immediately. Commands that already completed
/// remain applied on the device.
pub async fn deploy<C: Connector>(
    connector: &C,
    record: Option<&DomainRecord>,
    request: &DeployRequest,
    mode: DeployMode,
) -> Result<DeployOutcome, CoreError> {
    let Some(record) = record else {
        info!(domain = %request.domain, "no fortigate config found for {}", request.domain);
        return Ok(DeployOutcome::NoConfiguration {
            domain: request.domain.clone(),
        });
    };

    info!(domain = %request.domain, "deploying certificate");
    let cert = CertificateDescriptor::load(&request.domain, &request.key_file, &request.cert_file)?;
    info!(
        certificate = cert.name(),
        label = cert.label(),
        not_before = cert.not_before(),
        "certificate name"
    );

    let endpoint = &record.endpoint;
    info!(
        host = %endpoint.host,
        port = endpoint.port,
        username = %endpoint.username,
        "connecting"
    );
    let mut session = InteractiveSession::new(endpoint.clone());
    session.login(connector).await?;

    let outcome = apply(&mut session, &record.target, &cert, mode).await?;

    session.logout().await?;
    info!(domain = %request.domain, "finished deploy");
    Ok(outcome)
}

async fn apply<T: Transport>(
    session: &mut InteractiveSession<T>,
    target: &DeploymentTarget,
    cert: &CertificateDescriptor,
    mode: DeployMode,
) -> Result<DeployOutcome, CoreError> {
    let mut sequencer = CommandSequencer::new(session);

    let inventory = sequencer.list_certificates().await?;
    info!(
        count = inventory.len(),
        certificates = ?inventory.iter().collect::<Vec<_>>(),
        "found certificates"
    );

    let plan = DeploymentPlanner::plan(target, cert.name(), &inventory);
    if mode == DeployMode::DryRun {
        info!(decision = %plan.decision, bindings = ?plan.bindings, "dry run, device left unchanged");
        return Ok(DeployOutcome::Planned(plan));
    }

    match plan.decision {
        Decision::AlreadyPresent => {
            info!(certificate = cert.name(), "certificate already installed");
            Ok(DeployOutcome::AlreadyInstalled {
                domain: plan.domain,
                certificate_name: plan.certificate_name,
            })
        }
        Decision::MustInstall => {
            info!(certificate = cert.name(), "installing certificate");
            sequencer.install(cert).await?;
            for binding in &plan.bindings {
                info!(binding = %binding, certificate = cert.name(), "binding certificate");
                sequencer.bind(*binding, cert.name()).await?;
            }
            Ok(DeployOutcome::Installed {
                domain: plan.domain,
                certificate_name: plan.certificate_name,
                bindings: plan.bindings,
            })
        }
    }
}
