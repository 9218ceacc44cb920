//! Draining paginated output.

use std::time::Duration;

use fortihook_ssh::Transport;
use tracing::debug;

use super::pipe::{ReadError, SessionPipe};
use super::prompt::PromptMatcher;

const PROMPT: usize = 0;

/// Full output of a paginated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedOutput {
    /// Every page concatenated in order, pager markers removed.
    pub text: String,
    /// Number of screens the device printed (at least one).
    pub pages: usize,
}

/// Keeps a command's output flowing past `--More--` until the prompt returns.
pub struct PagingReader<'a> {
    prompt: &'a PromptMatcher,
    timeout: Duration,
}

impl<'a> PagingReader<'a> {
    pub fn new(prompt: &'a PromptMatcher, timeout: Duration) -> Self {
        Self { prompt, timeout }
    }

    /// Collect output for a command that was already sent. Each page wait
    /// gets the full timeout.
    pub async fn drain<T: Transport>(
        &self,
        pipe: &mut SessionPipe<T>,
    ) -> Result<PagedOutput, ReadError> {
        let patterns = [self.prompt.prompt(), self.prompt.more()];
        let mut text = String::new();
        let mut pages = 0;

        loop {
            let matched = pipe.read_until(&patterns, self.timeout).await?;
            text.push_str(&matched.before);
            pages += 1;
            if matched.index == PROMPT {
                debug!(pages, "paged output drained");
                return Ok(PagedOutput { text, pages });
            }
            pipe.send_line("").await.map_err(ReadError::Transport)?;
        }
    }
}
