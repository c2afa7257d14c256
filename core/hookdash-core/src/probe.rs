//! Two-tier activation discovery against the external provider.
//!
//! The provider is an optional, lazily-started process: a dead socket cannot
//! distinguish "not installed" from "not yet running", so an unreachable
//! endpoint triggers a fire-and-forget wake of the provider command followed
//! by exactly one retry. Every failure anywhere in the sequence collapses to
//! `Inactive`: probing is a status read, not a command, and it never raises
//! to its caller.

use std::env;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;

use hookdash_provider_protocol::{active_signal, Request, Response, MAX_RESPONSE_BYTES};

use crate::storage::StorageConfig;

const SOCKET_ENV: &str = "HOOKDASH_PROVIDER_SOCKET";
const WAKE_ENV: &str = "HOOKDASH_WAKE_COMMAND";
const WAKE_COMMAND: &str = "hookd";
const WAKE_ARG: &str = "wake";
const READ_TIMEOUT_MS: u64 = 600;
const WRITE_TIMEOUT_MS: u64 = 600;

/// Whether the hook framework is active in the current context.
///
/// Derived, never persisted; recomputed on each probe. `Unknown` is the
/// pre-probe default; a completed probe always lands on `Active` or
/// `Inactive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivationState {
    #[default]
    Unknown,
    Active,
    Inactive,
}

/// One provider query, with every branch explicit.
#[derive(Debug)]
enum QueryOutcome {
    /// The provider answered with an `active` boolean.
    Signal(bool),
    /// The provider was reachable but produced no usable signal
    /// (timeout, malformed response, missing field, error response).
    NoSignal,
    /// The socket could not be reached at all.
    Unreachable,
}

/// Best-effort prober for the hookd activation provider.
pub struct ActivationProber {
    socket_path: PathBuf,
}

impl ActivationProber {
    /// Resolves the provider socket from `HOOKDASH_PROVIDER_SOCKET`, falling
    /// back to the conventional path under the provider root.
    pub fn new(config: &StorageConfig) -> Self {
        let socket_path = env::var(SOCKET_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| config.provider_socket());
        Self { socket_path }
    }

    /// Targets an explicit socket path. Used by tests.
    pub fn with_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Probes the provider for the activation signal.
    ///
    /// Direct query first; if the socket is unreachable, fire a wake request
    /// at the provider command and retry the query once. Read/write timeouts
    /// keep the whole sequence bounded even against a hung provider.
    pub fn probe(&self) -> ActivationState {
        match self.query("probe") {
            QueryOutcome::Signal(active) => state_for(active),
            QueryOutcome::NoSignal => ActivationState::Inactive,
            QueryOutcome::Unreachable => {
                wake_provider();
                match self.query("probe-retry") {
                    QueryOutcome::Signal(active) => state_for(active),
                    QueryOutcome::NoSignal | QueryOutcome::Unreachable => {
                        ActivationState::Inactive
                    }
                }
            }
        }
    }

    fn query(&self, id: &str) -> QueryOutcome {
        let mut stream = match UnixStream::connect(&self.socket_path) {
            Ok(stream) => stream,
            Err(err) => {
                debug!(
                    error = %err,
                    path = %self.socket_path.display(),
                    "Provider socket unreachable"
                );
                return QueryOutcome::Unreachable;
            }
        };
        let _ = stream.set_read_timeout(Some(Duration::from_millis(READ_TIMEOUT_MS)));
        let _ = stream.set_write_timeout(Some(Duration::from_millis(WRITE_TIMEOUT_MS)));

        let request = Request::active(id);
        if serde_json::to_writer(&mut stream, &request).is_err()
            || stream.write_all(b"\n").is_err()
        {
            return QueryOutcome::NoSignal;
        }
        stream.flush().ok();

        match read_response(&mut stream) {
            Some(response) => match active_signal(&response) {
                Some(active) => QueryOutcome::Signal(active),
                None => QueryOutcome::NoSignal,
            },
            None => QueryOutcome::NoSignal,
        }
    }
}

fn state_for(active: bool) -> ActivationState {
    if active {
        ActivationState::Active
    } else {
        ActivationState::Inactive
    }
}

/// Fire-and-forget request that the provider process be started.
///
/// There is no response contract; a missing wake command means the provider
/// is not installed, which the retry will report as unreachable anyway.
fn wake_provider() {
    let command = env::var(WAKE_ENV).unwrap_or_else(|_| WAKE_COMMAND.to_string());
    match Command::new(&command)
        .arg(WAKE_ARG)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => debug!(command = %command, "Requested provider wake"),
        Err(err) => debug!(error = %err, command = %command, "Provider wake unavailable"),
    }
}

fn read_response(stream: &mut UnixStream) -> Option<Response> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                if buffer.len() > MAX_RESPONSE_BYTES {
                    debug!("Provider response exceeded maximum size");
                    return None;
                }
                if chunk[..n].contains(&b'\n') {
                    break;
                }
            }
            Err(err) => {
                debug!(error = %err, "Provider read failed");
                return None;
            }
        }
    }

    let newline_index = buffer.iter().position(|b| *b == b'\n');
    let response_bytes = match newline_index {
        Some(index) => &buffer[..index],
        None => buffer.as_slice(),
    };

    if response_bytes.is_empty() {
        return None;
    }

    serde_json::from_slice(response_bytes).ok()
}
