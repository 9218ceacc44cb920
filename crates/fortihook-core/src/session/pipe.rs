// Buffered pattern matching over a raw shell transport.
//
// The transport hands out arbitrary chunks. `SessionPipe` keeps everything
// received but not yet consumed, and `read_until` consumes up to the end
// of the earliest pattern match.

use std::time::Duration;

use fortihook_ssh::Transport;
use regex::Regex;
use tokio::time::Instant;
use tracing::trace;

/// Result of a successful [`SessionPipe::read_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    /// Index into the pattern slice of the pattern that matched.
    pub index: usize,
    /// Output received before the match. The matched text itself is
    /// consumed and not included.
    pub before: String,
}

/// Why a wait ended without a match.
#[derive(Debug)]
pub enum ReadError {
    /// No pattern matched before the deadline.
    Timeout,
    /// The remote side closed the stream.
    Closed,
    /// The transport failed while sending or receiving.
    Transport(fortihook_ssh::Error),
}

/// A transport plus its unconsumed receive buffer.
pub struct SessionPipe<T> {
    transport: T,
    buffer: String,
}

impl<T: Transport> SessionPipe<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buffer: String::new(),
        }
    }

    /// Send `line` followed by a newline.
    pub async fn send_line(&mut self, line: &str) -> Result<(), fortihook_ssh::Error> {
        let mut data = String::with_capacity(line.len() + 1);
        data.push_str(line);
        data.push('\n');
        self.transport.send(&data).await
    }

    /// Wait until one of `patterns` matches the buffered output.
    ///
    /// When several patterns match, the one starting earliest wins; ties go
    /// to the pattern listed first. The whole wait, however many chunks it
    /// takes, is bounded by `timeout`.
    pub async fn read_until(
        &mut self,
        patterns: &[&Regex],
        timeout: Duration,
    ) -> Result<Matched, ReadError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(matched) = self.take_match(patterns) {
                return Ok(matched);
            }
            match tokio::time::timeout_at(deadline, self.transport.recv()).await {
                Err(_) => return Err(ReadError::Timeout),
                Ok(Err(e)) => return Err(ReadError::Transport(e)),
                Ok(Ok(None)) => return Err(ReadError::Closed),
                Ok(Ok(Some(chunk))) => {
                    trace!(bytes = chunk.len(), "received output");
                    self.buffer.push_str(&chunk);
                }
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), fortihook_ssh::Error> {
        self.buffer.clear();
        self.transport.close().await
    }

    fn take_match(&mut self, patterns: &[&Regex]) -> Option<Matched> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some(m) = pattern.find(&self.buffer) {
                if best.is_none_or(|(start, _, _)| m.start() < start) {
                    best = Some((m.start(), m.end(), index));
                }
            }
        }

        let (start, end, index) = best?;
        let mut before: String = self.buffer.drain(..end).collect();
        before.truncate(start);
        Some(Matched { index, before })
    }
}
