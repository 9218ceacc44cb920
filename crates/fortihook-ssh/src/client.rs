//! russh-backed shell transport.
//!
//! [`SshConnector`] resolves the device address, verifies the host key,
//! authenticates with a password, and opens a PTY shell channel. The
//! resulting [`SshShell`] is the raw character pipe the session engine
//! drives.

use std::sync::Arc;

use russh::client::{Config, Handle, Handler, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::error::Error;
use crate::transport::{ConnectParams, Connector, HostKeyPolicy, Transport};

/// Terminal type requested for the shell. FortiOS only needs a dumb
/// line-oriented terminal.
const TERM_TYPE: &str = "vt100";
const TERM_COLS: u32 = 80;
const TERM_ROWS: u32 = 24;

// ── Connector ───────────────────────────────────────────────────────

/// Opens password-authenticated interactive shells over SSH.
#[derive(Clone)]
pub struct SshConnector {
    config: Arc<Config>,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl SshConnector {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Same as [`new`](Self::new), but with a non-default
    /// [`russh::client::Config`].
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    async fn open(&self, params: &ConnectParams) -> Result<SshShell, Error> {
        let handler = ClientHandler {
            host: params.host.clone(),
            port: params.port,
            policy: params.host_key.clone(),
        };

        debug!(host = %params.host, port = params.port, "opening SSH connection");
        let mut handle = russh::client::connect(
            Arc::clone(&self.config),
            (params.host.as_str(), params.port),
            handler,
        )
        .await?;

        let auth = handle
            .authenticate_password(&params.username, params.password.expose_secret())
            .await?;
        if !auth.success() {
            return Err(Error::Authentication {
                username: params.username.clone(),
            });
        }
        debug!(username = %params.username, "password authentication accepted");

        let channel = handle.channel_open_session().await?;
        channel
            .request_pty(false, TERM_TYPE, TERM_COLS, TERM_ROWS, 0, 0, &[])
            .await?;
        channel.request_shell(false).await?;

        Ok(SshShell {
            handle,
            channel,
            decoder: Utf8Decoder::default(),
        })
    }
}

impl Connector for SshConnector {
    type Transport = SshShell;

    async fn connect(&self, params: &ConnectParams) -> Result<SshShell, Error> {
        tokio::time::timeout(params.connect_timeout, self.open(params))
            .await
            .map_err(|_| Error::ConnectTimeout {
                host: params.host.clone(),
                port: params.port,
                timeout_secs: params.connect_timeout.as_secs(),
            })?
    }
}

// ── Shell ───────────────────────────────────────────────────────────

/// An open PTY shell channel plus the connection that carries it.
pub struct SshShell {
    handle: Handle<ClientHandler>,
    channel: Channel<Msg>,
    decoder: Utf8Decoder,
}

impl Transport for SshShell {
    async fn send(&mut self, data: &str) -> Result<(), Error> {
        self.channel.data(data.as_bytes()).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, Error> {
        loop {
            let text = match self.channel.wait().await {
                Some(ChannelMsg::Data { ref data }) => self.decoder.push(data),
                // stderr is part of what a human would see on the terminal
                Some(ChannelMsg::ExtendedData { ref data, ext: 1 }) => self.decoder.push(data),
                Some(ChannelMsg::Eof | ChannelMsg::Close) | None => {
                    return Ok(self.decoder.finish());
                }
                Some(_) => continue,
            };
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    async fn close(&mut self) -> Result<(), Error> {
        // The device usually hangs up on `exit` before we get here.
        if let Err(e) = self.channel.eof().await {
            debug!(error = %e, "channel already closed");
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}

// ── UTF-8 reassembly ────────────────────────────────────────────────

/// Decodes channel data packet by packet. A multi-byte character split
/// across packets is held back until its last byte arrives.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Append `data` and return everything that decodes so far. Invalid
    /// sequences become U+FFFD; an incomplete trailing sequence is kept.
    fn push(&mut self, data: &[u8]) -> String {
        self.pending.extend_from_slice(data);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let cut = match e.error_len() {
                        Some(len) => e.valid_up_to() + len,
                        None => e.valid_up_to(),
                    };
                    let rest = self.pending.split_off(cut);
                    out.push_str(&String::from_utf8_lossy(&self.pending));
                    self.pending = rest;
                    if e.error_len().is_none() {
                        return out;
                    }
                }
            }
        }
    }

    /// Whatever is still buffered when the stream ends.
    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(text)
    }
}

// ── Host key verification ───────────────────────────────────────────

/// russh callback handler applying the configured [`HostKeyPolicy`].
#[derive(Debug, Clone)]
pub struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl ClientHandler {
    fn reject(&self, reason: impl Into<String>) -> Error {
        Error::HostKeyRejected {
            host: self.host.clone(),
            port: self.port,
            reason: reason.into(),
        }
    }
}

impl Handler for ClientHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.policy {
            HostKeyPolicy::DangerAcceptAny => Ok(true),
            HostKeyPolicy::PublicKey(key) => {
                let expected = russh::keys::parse_public_key_base64(key)
                    .map_err(|e| self.reject(format!("configured host_key is invalid: {e}")))?;
                if expected == *server_public_key {
                    Ok(true)
                } else {
                    Err(self.reject("key does not match configured host_key"))
                }
            }
            HostKeyPolicy::KnownHosts => {
                match russh::keys::check_known_hosts(&self.host, self.port, server_public_key) {
                    Ok(true) => Ok(true),
                    Ok(false) => Err(self.reject("host is not in known_hosts")),
                    Err(e) => Err(self.reject(e.to_string())),
                }
            }
            HostKeyPolicy::AcceptNew => {
                match russh::keys::check_known_hosts(&self.host, self.port, server_public_key) {
                    Ok(true) => Ok(true),
                    Ok(false) => {
                        if let Err(e) = russh::keys::known_hosts::learn_known_hosts(
                            &self.host,
                            self.port,
                            server_public_key,
                        ) {
                            warn!(host = %self.host, error = %e, "could not record new host key");
                        } else {
                            debug!(host = %self.host, "recorded new host key in known_hosts");
                        }
                        Ok(true)
                    }
                    Err(e) => Err(self.reject(e.to_string())),
                }
            }
        }
    }
}
