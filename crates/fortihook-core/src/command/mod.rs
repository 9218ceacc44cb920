//! Device command lines and blocks.
//!
//! A [`CommandBlock`] is an ordered list of lines bounded by entering and
//! leaving a configuration context. Blocks are not atomic on the device:
//! every line that completed before a failure stays applied.

pub mod fortigate;
pub mod sequencer;

use std::fmt;

pub use sequencer::CommandSequencer;

/// One line of device input.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandLine {
    text: String,
    redacted: Option<String>,
    paged: bool,
}

impl CommandLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            redacted: None,
            paged: false,
        }
    }

    /// A line whose output may run past one terminal page.
    pub fn paged(text: impl Into<String>) -> Self {
        Self {
            paged: true,
            ..Self::new(text)
        }
    }

    /// A line carrying secret material. `Display` and `Debug` show
    /// `shown` instead of the real text.
    pub fn sensitive(text: impl Into<String>, shown: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            redacted: Some(shown.into()),
            paged: false,
        }
    }

    /// The exact text sent to the device.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_sensitive(&self) -> bool {
        self.redacted.is_some()
    }

    pub fn is_paged(&self) -> bool {
        self.paged
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.redacted.as_deref().unwrap_or(&self.text))
    }
}

impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandLine").field(&self.to_string()).finish()
    }
}

impl From<&str> for CommandLine {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Ordered lines executed one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBlock {
    pub label: &'static str,
    pub lines: Vec<CommandLine>,
}

impl CommandBlock {
    pub fn new(label: &'static str, lines: impl IntoIterator<Item = CommandLine>) -> Self {
        Self {
            label,
            lines: lines.into_iter().collect(),
        }
    }

    /// The lines as they appear in logs.
    pub fn display_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }
}
