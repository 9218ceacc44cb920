//! Configuration for fortihook.
//!
//! TOML records keyed by domain, loaded from an explicit ordered list of
//! files ([`ConfigSources`]) plus `FORTIHOOK_` environment overrides.
//! Credential resolution (env + keyring + plaintext) and translation to
//! `fortihook_core::DomainRecord` live here as well, so the binary only
//! decides *which* files to read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use fortihook_core::{DeploymentTarget, DeviceEndpoint, DomainRecord, HostKeyPolicy, PromptMatcher};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name for stored device passwords.
pub const KEYRING_SERVICE: &str = "fortihook";

/// File name looked up in every search directory.
pub const CONFIG_FILE_NAME: &str = "fortihook.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field} for '{domain}': {reason}")]
    Validation {
        domain: String,
        field: String,
        reason: String,
    },

    #[error("no password configured for '{domain}'")]
    NoCredentials { domain: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Values applied to every domain that does not override them.
    #[serde(default)]
    pub defaults: Defaults,

    /// Device records, keyed by certificate domain.
    #[serde(default)]
    pub domains: BTreeMap<String, DomainConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Seconds to wait for the prompt after each command.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds allowed for connect, handshake and authentication.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Host key policy: `accept-new`, `known-hosts`, `none`, or a base64 key.
    #[serde(default = "default_host_key")]
    pub host_key: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            host_key: default_host_key(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
fn default_connect_timeout() -> u64 {
    15
}
fn default_host_key() -> String {
    "accept-new".into()
}

/// The FortiGate serving one domain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Hostname or IP address of the FortiGate.
    pub host: String,

    #[serde(default = "default_sshport")]
    pub sshport: u16,

    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Bind the certificate to the SSL-VPN portal.
    #[serde(default)]
    pub vpn: bool,

    /// Bind the certificate to the wireless controller.
    #[serde(default)]
    pub wifi: bool,

    /// Bind the certificate to the admin GUI.
    #[serde(default)]
    pub admin: bool,

    /// Prompt regex override.
    pub prompt: Option<String>,

    /// Override `defaults.timeout`.
    pub timeout: Option<u64>,

    /// Override `defaults.host_key`.
    pub host_key: Option<String>,
}

fn default_sshport() -> u16 {
    22
}

// ── Config sources ──────────────────────────────────────────────────

/// Ordered list of config files. Later files override earlier ones;
/// files that do not exist are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources(Vec<PathBuf>);

impl ConfigSources {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self(paths.into_iter().collect())
    }

    /// System locations, `$BASEDIR`, the platform config dir, and the
    /// working directory, in that order.
    pub fn search_list(basedir: Option<&Path>) -> Self {
        let mut paths = vec![
            PathBuf::from("/etc/dehydrated").join(CONFIG_FILE_NAME),
            PathBuf::from("/usr/local/etc/dehydrated").join(CONFIG_FILE_NAME),
        ];
        if let Some(basedir) = basedir {
            paths.push(basedir.join(CONFIG_FILE_NAME));
        }
        paths.push(config_path());
        paths.push(PathBuf::from(CONFIG_FILE_NAME));
        Self(paths)
    }

    /// [`search_list`](Self::search_list) with dehydrated's `BASEDIR`.
    pub fn default_search_list() -> Self {
        let basedir = std::env::var_os("BASEDIR").map(PathBuf::from);
        Self::search_list(basedir.as_deref())
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.0
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file (XDG on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "fortihook", "fortihook").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(CONFIG_FILE_NAME);
            p
        },
        |dirs| dirs.config_dir().join(CONFIG_FILE_NAME),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fortihook");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Merge every source in order, then `FORTIHOOK_*` environment overrides
/// (`__` separates nesting levels, e.g. `FORTIHOOK_DEFAULTS__TIMEOUT`).
pub fn load_config(sources: &ConfigSources) -> Result<Config, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    for path in sources.paths() {
        debug!(path = %path.display(), exists = path.exists(), "config source");
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("FORTIHOOK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Copy of `config` safe to print: plaintext passwords are masked.
pub fn redacted(config: &Config) -> Config {
    let mut out = config.clone();
    for domain in out.domains.values_mut() {
        if domain.password.is_some() {
            domain.password = Some("********".into());
        }
    }
    out
}

/// Serialize config to TOML.
pub fn to_toml(config: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a device password: `password_env`, then the system keyring,
/// then the plaintext `password` field.
pub fn resolve_password(cfg: &DomainConfig, domain: &str) -> Result<SecretString, ConfigError> {
    // 1. Domain's password_env → env var lookup
    if let Some(ref env_name) = cfg.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(domain)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = cfg.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        domain: domain.into(),
    })
}

/// Store a device password in the system keyring.
pub fn store_password(domain: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(domain))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(domain: &str) -> String {
    format!("{domain}/password")
}

// ── Translation to core types ───────────────────────────────────────

/// Build the deploy record for `domain`. `Ok(None)` when the config has
/// no entry for it.
pub fn resolve_record(config: &Config, domain: &str) -> Result<Option<DomainRecord>, ConfigError> {
    let Some(cfg) = config.domains.get(domain) else {
        return Ok(None);
    };
    domain_to_record(cfg, domain, &config.defaults).map(Some)
}

/// Validate one domain entry and resolve its credentials.
pub fn domain_to_record(
    cfg: &DomainConfig,
    domain: &str,
    defaults: &Defaults,
) -> Result<DomainRecord, ConfigError> {
    let invalid = |field: &str, reason: String| ConfigError::Validation {
        domain: domain.into(),
        field: field.into(),
        reason,
    };

    if cfg.host.trim().is_empty() {
        return Err(invalid("host", "must not be empty".into()));
    }
    if cfg.username.trim().is_empty() {
        return Err(invalid("username", "must not be empty".into()));
    }

    let prompt = match cfg.prompt {
        Some(ref pattern) => {
            PromptMatcher::new(pattern).map_err(|e| invalid("prompt", e.to_string()))?
        }
        None => PromptMatcher::fortigate(),
    };

    let password = resolve_password(cfg, domain)?;
    let host_key = cfg.host_key.as_deref().unwrap_or(&defaults.host_key);

    let mut endpoint = DeviceEndpoint::new(cfg.host.clone(), cfg.username.clone(), password);
    endpoint.port = cfg.sshport;
    endpoint.prompt = prompt;
    endpoint.host_key = HostKeyPolicy::from_config(host_key);
    endpoint.command_timeout = Duration::from_secs(cfg.timeout.unwrap_or(defaults.timeout));
    endpoint.connect_timeout = Duration::from_secs(defaults.connect_timeout);

    Ok(DomainRecord {
        endpoint,
        target: DeploymentTarget {
            domain: domain.to_owned(),
            wifi: cfg.wifi,
            vpn: cfg.vpn,
            admin: cfg.admin,
        },
    })
}
