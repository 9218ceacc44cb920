//! dehydrated hook entry point.
//!
//! dehydrated runs `fortihook <event> <args...>` for every hook event. Only
//! the certificate events deploy anything; every other event is a no-op so
//! one hook script can be shared with other handlers.

use std::path::PathBuf;
use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::debug;

use fortihook_core::{DeployMode, DeployRequest};

use crate::cli::GlobalOpts;
use crate::commands::deploy;
use crate::error::CliError;

/// Hook events that trigger a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum HookEvent {
    /// A new certificate was issued.
    DeployCert,
    /// The certificate was not renewed; deploy anyway in case the device
    /// was reset or replaced.
    UnchangedCert,
}

/// Positional values passed with a certificate event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookArgs {
    pub domain: String,
    pub key_file: String,
    pub cert_file: String,
    pub fullchain_file: String,
    pub chain_file: String,
}

impl HookArgs {
    /// Take the five values in dehydrated's order. With fewer than five,
    /// every value is empty. Extra values are ignored.
    pub fn from_values(values: &[String]) -> Self {
        match values {
            [domain, key_file, cert_file, fullchain_file, chain_file, ..] => Self {
                domain: domain.clone(),
                key_file: key_file.clone(),
                cert_file: cert_file.clone(),
                fullchain_file: fullchain_file.clone(),
                chain_file: chain_file.clone(),
            },
            _ => Self::default(),
        }
    }

    fn request(&self) -> DeployRequest {
        DeployRequest {
            domain: self.domain.clone(),
            key_file: PathBuf::from(&self.key_file),
            cert_file: PathBuf::from(&self.cert_file),
        }
    }
}

pub async fn handle(raw: &[String], global: &GlobalOpts) -> Result<(), CliError> {
    let Some((name, values)) = raw.split_first() else {
        return Ok(());
    };

    let Ok(event) = HookEvent::from_str(name) else {
        debug!(event = %name, "ignoring hook event");
        return Ok(());
    };

    let args = HookArgs::from_values(values);
    debug!(
        %event,
        domain = %args.domain,
        key = %args.key_file,
        cert = %args.cert_file,
        fullchain = %args.fullchain_file,
        chain = %args.chain_file,
        "hook event"
    );

    let config = crate::config::load(global)?;
    deploy::deploy_one(&config, &args.request(), DeployMode::Apply).await?;
    Ok(())
}
