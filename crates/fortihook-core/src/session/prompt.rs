//! Prompt grammar.
//!
//! The prompt is the only turn-completion signal: a command is finished
//! when the device prints its prompt again, or stops at a pager marker.

use regex::Regex;

use crate::error::CoreError;

/// Stock FortiOS CLI prompt: a line break, the hostname, an optional
/// parenthesised marker (` (local)` on HA secondaries, the current
/// context inside `config`/`edit` blocks), then `# ` or `$ `.
pub const DEFAULT_PROMPT: &str = r"\r\n[^\r\n ]+( \([^\r\n()]+\))? [#$] ";

/// Pager marker printed when output exceeds one terminal page.
pub const MORE_MARKER: &str = "--More--";

/// Compiled prompt and pager patterns.
#[derive(Debug, Clone)]
pub struct PromptMatcher {
    prompt: Regex,
    more: Regex,
}

impl PromptMatcher {
    /// Compile a custom prompt pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PromptPattern`] if `pattern` is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self, CoreError> {
        let prompt = Regex::new(pattern).map_err(|e| CoreError::PromptPattern {
            pattern: pattern.to_owned(),
            source: Box::new(e),
        })?;
        Ok(Self {
            prompt,
            more: more_regex(),
        })
    }

    /// The stock FortiGate prompt.
    pub fn fortigate() -> Self {
        Self {
            prompt: default_regex(),
            more: more_regex(),
        }
    }

    pub fn prompt(&self) -> &Regex {
        &self.prompt
    }

    pub fn more(&self) -> &Regex {
        &self.more
    }
}

impl Default for PromptMatcher {
    fn default() -> Self {
        Self::fortigate()
    }
}

fn default_regex() -> Regex {
    Regex::new(DEFAULT_PROMPT).expect("built-in prompt pattern compiles")
}

fn more_regex() -> Regex {
    Regex::new(&regex::escape(MORE_MARKER)).expect("escaped literal compiles")
}
