//! In-memory FortiGate CLI used by the integration tests.
//!
//! The fake speaks just enough FortiOS: context prompts, echo, a paged
//! `get` listing under `config vpn certificate local`, multi-line quoted
//! values, `set`/`unset`/`end` in the global and SSL-VPN contexts, and
//! `exit`. Every logical line it receives is recorded.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use fortihook_core::{DeploymentTarget, DeviceEndpoint, DomainRecord};
use fortihook_ssh::{ConnectParams, Connector, Error, Transport};
use secrecy::SecretString;

pub const HOSTNAME: &str = "FGT60E";
pub const DOMAIN: &str = "www.example.com";
pub const CERT_NAME: &str = "LE_www_20250101120000Z";

/// Paths of the on-disk key and certificate fixtures.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn key_file() -> PathBuf {
    fixture("www.example.com.key.pem")
}

pub fn cert_file() -> PathBuf {
    fixture("www.example.com.crt.pem")
}

pub fn record(wifi: bool, vpn: bool, admin: bool) -> DomainRecord {
    let mut endpoint = DeviceEndpoint::new("fgt.example.com", "admin", SecretString::from("hunter2"));
    endpoint.command_timeout = Duration::from_secs(5);
    DomainRecord {
        endpoint,
        target: DeploymentTarget {
            domain: DOMAIN.into(),
            wifi,
            vpn,
            admin,
        },
    }
}

// ── Device state ────────────────────────────────────────────────────

#[derive(Debug)]
pub struct DeviceState {
    /// Local certificates, in listing order.
    pub certificates: Vec<String>,
    /// Lines per screen of `get` output.
    pub page_size: usize,
    /// Committed `set` values, keyed by `<context>.<field>`.
    pub settings: BTreeMap<String, String>,
    /// Every logical command line received, secrets included.
    pub received: Vec<String>,
    /// Empty lines sent to continue past `--More--`.
    pub pages_continued: usize,
    pub connects: usize,
    /// Never print the login prompt.
    pub mute_login: bool,
    pub reject_auth: bool,
    /// Stop answering once this many commands were received.
    pub silent_after: Option<usize>,
    /// Split output into chunks of at most this many bytes.
    pub chunk_size: usize,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            certificates: vec!["Fortinet_Factory".into(), "Fortinet_SSL".into()],
            page_size: 64,
            settings: BTreeMap::new(),
            received: Vec::new(),
            pages_continued: 0,
            connects: 0,
            mute_login: false,
            reject_auth: false,
            silent_after: None,
            chunk_size: 4096,
        }
    }
}

/// Shared handle to the fake device.
#[derive(Clone, Default)]
pub struct FakeFortigate {
    state: Arc<Mutex<DeviceState>>,
}

impl FakeFortigate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, f: impl FnOnce(&mut DeviceState)) -> Self {
        f(&mut self.state());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
    }

    pub fn connector(&self) -> FakeConnector {
        FakeConnector {
            device: self.clone(),
        }
    }

    /// Received commands with PEM payloads shortened for assertions.
    pub fn commands(&self) -> Vec<String> {
        self.state()
            .received
            .iter()
            .map(|line| {
                if line.starts_with("set private-key ") {
                    "set private-key <key>".to_owned()
                } else if line.starts_with("set certificate ") {
                    "set certificate <cert>".to_owned()
                } else {
                    line.clone()
                }
            })
            .collect()
    }
}

// ── Connector ───────────────────────────────────────────────────────

pub struct FakeConnector {
    device: FakeFortigate,
}

impl Connector for FakeConnector {
    type Transport = FakeShell;

    async fn connect(&self, params: &ConnectParams) -> Result<FakeShell, Error> {
        let mut state = self.device.state();
        state.connects += 1;
        if state.reject_auth {
            return Err(Error::Authentication {
                username: params.username.clone(),
            });
        }
        let mut shell = FakeShell {
            device: self.device.clone(),
            outbox: VecDeque::new(),
            partial: String::new(),
            context: Vec::new(),
            editing: None,
            staged: BTreeMap::new(),
            pending_pages: VecDeque::new(),
            closed: false,
        };
        if !state.mute_login {
            let banner = format!("\r\nWelcome to {HOSTNAME}\r\n{}", shell.prompt());
            shell.emit(&banner, state.chunk_size);
        }
        Ok(shell)
    }
}

// ── Shell ───────────────────────────────────────────────────────────

pub struct FakeShell {
    device: FakeFortigate,
    outbox: VecDeque<String>,
    /// Input received but not yet terminated by an unquoted newline.
    partial: String,
    context: Vec<String>,
    /// Certificate being edited and its staged key/cert flags.
    editing: Option<String>,
    staged: BTreeMap<String, String>,
    pending_pages: VecDeque<String>,
    closed: bool,
}

impl FakeShell {
    fn prompt(&self) -> String {
        match self.context.last() {
            Some(ctx) => format!("\r\n{HOSTNAME} ({ctx}) # "),
            None => format!("\r\n{HOSTNAME} # "),
        }
    }

    fn emit(&mut self, text: &str, chunk_size: usize) {
        let bytes = text.as_bytes();
        for chunk in bytes.chunks(chunk_size.max(1)) {
            self.outbox
                .push_back(String::from_utf8_lossy(chunk).into_owned());
        }
    }

    fn accept(&mut self, data: &str) {
        self.partial.push_str(data);
        while let Some(line) = self.take_line() {
            self.handle(&line);
        }
    }

    /// Next newline-terminated line outside double quotes.
    fn take_line(&mut self) -> Option<String> {
        let mut quoted = false;
        let end = self.partial.char_indices().find_map(|(i, c)| match c {
            '"' => {
                quoted = !quoted;
                None
            }
            '\n' if !quoted => Some(i),
            _ => None,
        })?;
        let mut line: String = self.partial.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    fn handle(&mut self, line: &str) {
        let device = Arc::clone(&self.device.state);
        let mut state = device.lock().unwrap();
        let chunk_size = state.chunk_size;

        if !self.pending_pages.is_empty() {
            state.pages_continued += 1;
            let page = self.pending_pages.pop_front().unwrap_or_default();
            let mut out = format!("\r          \r{page}");
            if self.pending_pages.is_empty() {
                out.push_str(&self.prompt());
            } else {
                out.push_str(" --More-- ");
            }
            drop(state);
            self.emit(&out, chunk_size);
            return;
        }

        state.received.push(line.to_owned());
        if state
            .silent_after
            .is_some_and(|limit| state.received.len() > limit)
        {
            return;
        }

        let echo = format!("{}\r\n", line.replace('\n', "\r\n"));
        let body = self.respond(line, &mut state);
        drop(state);

        if self.closed {
            self.emit(&echo, chunk_size);
            return;
        }
        match body {
            Response::Text(body) => {
                let out = format!("{echo}{body}{}", self.prompt());
                self.emit(&out, chunk_size);
            }
            Response::Paged(mut pages) => {
                let first = pages.pop_front().unwrap_or_default();
                let tail = if pages.is_empty() {
                    self.prompt()
                } else {
                    " --More-- ".to_owned()
                };
                self.pending_pages = pages;
                self.emit(&format!("{echo}{first}{tail}"), chunk_size);
            }
        }
    }

    fn respond(&mut self, line: &str, state: &mut DeviceState) -> Response {
        let ctx = self.context.last().cloned();
        match (ctx.as_deref(), line) {
            (_, "exit") if self.context.is_empty() => {
                self.closed = true;
                Response::Text(String::new())
            }
            (None, "config vpn certificate local") => self.enter("local"),
            (None, "config system global") => self.enter("global"),
            (None, "config vpn ssl settings") => self.enter("settings"),
            (Some("local"), "get") => Response::Paged(listing(state)),
            (Some("local"), cmd) if cmd.starts_with("edit ") => {
                let name = cmd.trim_start_matches("edit ").to_owned();
                self.editing = Some(name.clone());
                self.staged.clear();
                self.enter(&name)
            }
            (Some(_), "end") => {
                if let Some(name) = self.editing.take() {
                    if self.staged.contains_key("private-key")
                        && self.staged.contains_key("certificate")
                        && !state.certificates.contains(&name)
                    {
                        state.certificates.push(name);
                    }
                } else if let Some(ctx) = self.context.first() {
                    for (field, value) in std::mem::take(&mut self.staged) {
                        if value.is_empty() {
                            state.settings.remove(&format!("{ctx}.{field}"));
                        } else {
                            state.settings.insert(format!("{ctx}.{field}"), value);
                        }
                    }
                }
                self.staged.clear();
                self.context.clear();
                Response::Text(String::new())
            }
            (Some(_), cmd) if cmd.starts_with("set ") => {
                let rest = cmd.trim_start_matches("set ");
                let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
                self.staged.insert(field.to_owned(), value.to_owned());
                Response::Text(String::new())
            }
            (Some(_), cmd) if cmd.starts_with("unset ") => {
                let field = cmd.trim_start_matches("unset ");
                self.staged.insert(field.to_owned(), String::new());
                Response::Text(String::new())
            }
            _ => Response::Text("Unknown action 0\r\nCommand fail. Return code -1\r\n".into()),
        }
    }

    fn enter(&mut self, ctx: &str) -> Response {
        self.context.push(ctx.to_owned());
        Response::Text(String::new())
    }
}

enum Response {
    Text(String),
    Paged(VecDeque<String>),
}

/// `get` output split into screens of `page_size` lines.
fn listing(state: &DeviceState) -> VecDeque<String> {
    let lines: Vec<String> = state
        .certificates
        .iter()
        .flat_map(|name| {
            [
                format!("== [ {name} ]"),
                format!("name: {name}    "),
                "password: *".to_owned(),
                "comments: ".to_owned(),
                "source: user".to_owned(),
            ]
        })
        .collect();
    let mut pages: VecDeque<String> = lines
        .chunks(state.page_size.max(1))
        .map(|page| page.iter().map(|l| format!("{l}\r\n")).collect())
        .collect();
    if pages.is_empty() {
        pages.push_back(String::new());
    }
    pages
}

impl Transport for FakeShell {
    async fn send(&mut self, data: &str) -> Result<(), Error> {
        self.accept(data);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, Error> {
        let next = self.outbox.pop_front();
        match next {
            Some(chunk) => Ok(Some(chunk)),
            None if self.closed => Ok(None),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.closed = true;
        Ok(())
    }
}
