//! Certificate descriptors and device-side naming.
//!
//! Certificates are stored on the device as `LE_<label>_<notBefore>`, where
//! `label` is the first DNS label of the domain and `notBefore` is the
//! certificate's validity start in ASN.1 GeneralizedTime form
//! (`YYYYMMDDhhmmssZ`). A renewed certificate therefore always gets a new
//! name, and re-running a deploy with the same certificate finds the name
//! already present.

use std::fmt;
use std::path::Path;

use secrecy::SecretString;
use x509_cert::Certificate;
use x509_cert::der::DecodePem;

use crate::error::CoreError;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END: &str = "-----END CERTIFICATE-----";

/// Key and certificate material for one deploy, with its device name.
#[derive(Clone)]
pub struct CertificateDescriptor {
    label: String,
    not_before: String,
    name: String,
    private_key: SecretString,
    certificate_pem: String,
}

impl CertificateDescriptor {
    /// Build a descriptor from already-extracted parts.
    pub fn new(
        domain: &str,
        not_before: impl Into<String>,
        private_key: SecretString,
        certificate_pem: impl Into<String>,
    ) -> Self {
        let label = domain_label(domain).to_owned();
        let not_before = not_before.into();
        let name = certificate_name(&label, &not_before);
        Self {
            label,
            not_before,
            name,
            private_key,
            certificate_pem: certificate_pem.into(),
        }
    }

    /// Parse the first certificate in `certificate_pem` for its validity
    /// start.
    pub fn from_pem(
        domain: &str,
        private_key: SecretString,
        certificate_pem: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let certificate_pem = certificate_pem.into();
        let block = first_certificate_block(&certificate_pem).ok_or_else(|| {
            CoreError::Certificate {
                message: "no PEM certificate block found".into(),
            }
        })?;
        let cert = Certificate::from_pem(block.as_bytes()).map_err(|e| CoreError::Certificate {
            message: format!("cannot decode certificate: {e}"),
        })?;
        let not_before = generalized_time(&cert.tbs_certificate.validity.not_before);
        Ok(Self::new(domain, not_before, private_key, certificate_pem))
    }

    /// Read a private key file and a certificate file from disk.
    pub fn load(domain: &str, key_file: &Path, cert_file: &Path) -> Result<Self, CoreError> {
        let certificate_pem = read(cert_file)?;
        let private_key = SecretString::from(read(key_file)?);
        Self::from_pem(domain, private_key, certificate_pem)
    }

    /// Device-side certificate name. Computed once at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn not_before(&self) -> &str {
        &self.not_before
    }

    pub fn private_key(&self) -> &SecretString {
        &self.private_key
    }

    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }
}

impl fmt::Debug for CertificateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateDescriptor")
            .field("name", &self.name)
            .field("not_before", &self.not_before)
            .finish_non_exhaustive()
    }
}

/// Everything before the first `.` of `domain`, or all of it.
pub fn domain_label(domain: &str) -> &str {
    domain.split_once('.').map_or(domain, |(label, _)| label)
}

pub fn certificate_name(label: &str, not_before: &str) -> String {
    format!("LE_{label}_{not_before}")
}

fn generalized_time(time: &x509_cert::time::Time) -> String {
    let dt = time.to_date_time();
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}Z",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minutes(),
        dt.seconds()
    )
}

fn first_certificate_block(pem: &str) -> Option<&str> {
    let begin = pem.find(PEM_BEGIN)?;
    let end = begin + pem.get(begin..)?.find(PEM_END)? + PEM_END.len();
    pem.get(begin..end)
}

fn read(path: &Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
