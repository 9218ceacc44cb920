//! Install-or-skip decision and binding plan.

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::config::DeploymentTarget;
use crate::inventory::CertificateInventory;

/// Whether the certificate has to be uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    AlreadyPresent,
    MustInstall,
}

/// A service that can be pointed at the new certificate.
///
/// Variant order is the order bindings are applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Wifi,
    Vpn,
    Admin,
}

impl Binding {
    fn enabled(self, target: &DeploymentTarget) -> bool {
        match self {
            Self::Wifi => target.wifi,
            Self::Vpn => target.vpn,
            Self::Admin => target.admin,
        }
    }
}

/// What a deploy will do (or would do, in a dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    pub domain: String,
    pub certificate_name: String,
    pub decision: Decision,
    pub bindings: Vec<Binding>,
    /// Number of certificates already on the device.
    pub installed_count: usize,
}

pub struct DeploymentPlanner;

impl DeploymentPlanner {
    pub fn decide(name: &str, inventory: &CertificateInventory) -> Decision {
        if inventory.contains(name) {
            Decision::AlreadyPresent
        } else {
            Decision::MustInstall
        }
    }

    /// Enabled bindings in application order.
    pub fn bindings(target: &DeploymentTarget) -> Vec<Binding> {
        Binding::iter().filter(|b| b.enabled(target)).collect()
    }

    /// Bindings are only applied together with a fresh install; a
    /// certificate that is already present is left exactly as it is.
    pub fn plan(
        target: &DeploymentTarget,
        name: &str,
        inventory: &CertificateInventory,
    ) -> DeploymentPlan {
        let decision = Self::decide(name, inventory);
        let bindings = match decision {
            Decision::MustInstall => Self::bindings(target),
            Decision::AlreadyPresent => Vec::new(),
        };
        DeploymentPlan {
            domain: target.domain.clone(),
            certificate_name: name.to_owned(),
            decision,
            bindings,
            installed_count: inventory.len(),
        }
    }
}
