//! Installed-certificate inventory.
//!
//! Grammar of the `get` listing under `config vpn certificate local`: one
//! entry per certificate, each starting with a line
//!
//! ```text
//! name: <token>
//! ```
//!
//! where `<token>` is the first whitespace-delimited word after the colon.
//! Both CR and LF end a line, so carriage returns never reach the matcher
//! and the pager's `\r   \r` erase sequence leaves the next line intact.
//! Every other line (the echoed command, attribute lines, blank lines,
//! pager residue) is skipped.

use std::collections::BTreeSet;

use tracing::trace;

const NAME_FIELD: &str = "name:";

/// Certificate names found on the device. Rebuilt on every deploy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateInventory {
    names: BTreeSet<String>,
}

impl CertificateInventory {
    pub fn parse(listing: &str) -> Self {
        let mut names = BTreeSet::new();
        let mut skipped = 0_usize;

        for line in listing.split(['\r', '\n']) {
            match parse_name(line) {
                Some(name) => {
                    names.insert(name.to_owned());
                }
                None => skipped += 1,
            }
        }

        trace!(found = names.len(), skipped, "parsed certificate listing");
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn parse_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(NAME_FIELD)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}
