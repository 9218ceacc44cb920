// ── Interactive device session ──
//
// Owns the shell transport for one login. Every operation is strictly
// half-duplex: send one line, wait for the prompt, return what the device
// printed in between. A session is single-use; once it has failed or
// logged out it rejects everything.

pub mod paging;
pub mod pipe;
pub mod prompt;

use fortihook_ssh::{Connector, Transport};
use strum::Display;
use tracing::{debug, trace, warn};

use crate::command::CommandLine;
use crate::config::DeviceEndpoint;
use crate::error::CoreError;

pub use paging::{PagedOutput, PagingReader};
pub use pipe::{Matched, ReadError, SessionPipe};
pub use prompt::{DEFAULT_PROMPT, MORE_MARKER, PromptMatcher};

/// Line sent to end the shell.
const LOGOUT_COMMAND: &str = "exit";

/// Lifecycle of an [`InteractiveSession`].
///
/// ```text
/// Disconnected → Authenticating → Ready ⇄ CommandInFlight → LoggedOut
///                      └──────────────┴──────────┴──→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    Disconnected,
    Authenticating,
    Ready,
    CommandInFlight,
    LoggedOut,
    Failed,
}

/// A logged-in CLI session on one device.
pub struct InteractiveSession<T> {
    endpoint: DeviceEndpoint,
    state: SessionState,
    pipe: Option<SessionPipe<T>>,
}

impl<T: Transport> InteractiveSession<T> {
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self {
            endpoint,
            state: SessionState::Disconnected,
            pipe: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the transport and wait for the first prompt.
    pub async fn login<C>(&mut self, connector: &C) -> Result<(), CoreError>
    where
        C: Connector<Transport = T>,
    {
        if self.state != SessionState::Disconnected {
            return Err(self.invalid("log in"));
        }
        self.transition(SessionState::Authenticating);

        let transport = match connector.connect(&self.endpoint.connect_params()).await {
            Ok(transport) => transport,
            Err(e) => {
                self.transition(SessionState::Failed);
                return Err(e.into());
            }
        };

        let mut pipe = SessionPipe::new(transport);
        let outcome = pipe
            .read_until(&[self.endpoint.prompt.prompt()], self.endpoint.command_timeout)
            .await;
        self.pipe = Some(pipe);
        self.settle(outcome, || "login".to_owned())?;

        debug!(host = %self.endpoint.host, "logged in");
        Ok(())
    }

    /// Send one line and wait for the prompt. Returns the output printed
    /// in between, including the device's echo of the line.
    pub async fn execute(&mut self, line: &CommandLine) -> Result<String, CoreError> {
        self.begin("execute a command")?;
        debug!(command = %line, sensitive = line.is_sensitive(), "sending");

        let timeout = self.endpoint.command_timeout;
        let prompt = self.endpoint.prompt.prompt();
        let outcome = match self.pipe.as_mut() {
            Some(pipe) => match pipe.send_line(line.text()).await {
                Ok(()) => pipe.read_until(&[prompt], timeout).await,
                Err(e) => Err(ReadError::Transport(e)),
            },
            None => Err(ReadError::Closed),
        };

        self.settle(outcome, || line.to_string())
            .map(|matched| matched.before)
    }

    /// Send one line whose output may span several pages, and return all
    /// of it once the prompt comes back.
    pub async fn execute_paged(&mut self, line: &CommandLine) -> Result<PagedOutput, CoreError> {
        self.begin("execute a command")?;
        debug!(command = %line, "sending (paged)");

        let reader = PagingReader::new(&self.endpoint.prompt, self.endpoint.command_timeout);
        let outcome = match self.pipe.as_mut() {
            Some(pipe) => match pipe.send_line(line.text()).await {
                Ok(()) => reader.drain(pipe).await,
                Err(e) => Err(ReadError::Transport(e)),
            },
            None => Err(ReadError::Closed),
        };

        self.settle(outcome, || line.to_string())
    }

    /// Send `exit` and close the transport. Does not wait for a prompt;
    /// the device hangs up.
    pub async fn logout(&mut self) -> Result<(), CoreError> {
        if self.state != SessionState::Ready {
            return Err(self.invalid("log out"));
        }
        let Some(mut pipe) = self.pipe.take() else {
            return Err(self.invalid("log out"));
        };

        if let Err(e) = pipe.send_line(LOGOUT_COMMAND).await {
            self.transition(SessionState::Failed);
            return Err(e.into());
        }
        if let Err(e) = pipe.close().await {
            debug!(error = %e, "transport close after logout");
        }

        self.transition(SessionState::LoggedOut);
        Ok(())
    }

    // ── State bookkeeping ────────────────────────────────────────────

    fn begin(&mut self, operation: &'static str) -> Result<(), CoreError> {
        if self.state != SessionState::Ready {
            return Err(self.invalid(operation));
        }
        self.state = SessionState::CommandInFlight;
        trace!(state = %self.state, "session state");
        Ok(())
    }

    fn settle<R>(
        &mut self,
        outcome: Result<R, ReadError>,
        step: impl FnOnce() -> String,
    ) -> Result<R, CoreError> {
        match outcome {
            Ok(value) => {
                if self.state == SessionState::CommandInFlight {
                    self.state = SessionState::Ready;
                    trace!(state = %self.state, "session state");
                } else {
                    self.transition(SessionState::Ready);
                }
                Ok(value)
            }
            Err(err) => {
                self.transition(SessionState::Failed);
                let step = step();
                warn!(host = %self.endpoint.host, step = %step, "device did not complete step");
                Err(match err {
                    ReadError::Timeout => CoreError::ProtocolTimeout {
                        step,
                        timeout: self.endpoint.command_timeout,
                    },
                    ReadError::Closed => CoreError::ChannelClosed { step },
                    ReadError::Transport(e) => e.into(),
                })
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }

    fn invalid(&self, operation: &'static str) -> CoreError {
        CoreError::InvalidState {
            operation,
            state: self.state,
        }
    }
}
