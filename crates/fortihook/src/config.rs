//! CLI configuration: a thin wrapper around `fortihook_config`.
//!
//! The only CLI-level decision is which files to read: the `--config`
//! flags when given, otherwise the standard search list.

use fortihook_core::DomainRecord;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use fortihook_config::{Config, ConfigSources, load_config, redacted, to_toml};

/// Config files selected by the global flags.
pub fn sources(global: &GlobalOpts) -> ConfigSources {
    if global.config.is_empty() {
        ConfigSources::default_search_list()
    } else {
        ConfigSources::new(global.config.iter().cloned())
    }
}

/// Load and merge every selected config file.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config(&sources(global))?)
}

/// Record for `domain`, or `None` when the domain is not configured.
pub fn record(config: &Config, domain: &str) -> Result<Option<DomainRecord>, CliError> {
    Ok(fortihook_config::resolve_record(config, domain)?)
}
