//! SSH transport layer wrapping russh.
//!
//! This module defines the session establishment and command execution
//! seams the chain builder and coordinator are written against, plus the
//! russh-backed production implementation. A session is one authenticated
//! SSH connection; tunneled sessions are opened *via* an existing one.

pub mod config;
mod ssh;

#[cfg(test)]
pub(crate) mod fake;

pub use config::{HostKeyPolicy, HopTarget, SessionAuth, SshTransportConfig};
pub use ssh::{SshSession, SshTransport};

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Output captured from one remote command execution.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Collected stdout, lossily decoded.
    pub stdout: String,

    /// Collected stderr, lossily decoded.
    pub stderr: String,

    /// Exit status, when the server reported one before closing the
    /// channel. Network devices do not always send it.
    pub exit_status: Option<u32>,
}

/// One live, authenticated SSH session.
pub trait Session: Send + Sync {
    /// Run a command and collect its output.
    ///
    /// The timeout bounds the whole exchange; on expiry the command may
    /// still be running remotely, but the local channel is abandoned.
    fn execute(
        &self,
        command: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<ExecOutput, TransportError>> + Send;

    /// Close the session. Idempotent; closing twice is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Session establishment, direct or tunneled through an existing session.
///
/// Both connect paths must fail fast: the timeout covers TCP (or tunnel)
/// setup, the SSH handshake, and authentication. Unreachable hosts are
/// routine in this domain and must never stall a whole chain build.
pub trait Transport: Send + Sync {
    type Session: Session + Send + 'static;

    /// Open an authenticated session directly to `target`.
    fn connect(
        &self,
        target: &HopTarget,
        timeout: Duration,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;

    /// Open an authenticated session to `target`, carried over a tunnel
    /// through `via`.
    fn connect_via(
        &self,
        via: &Self::Session,
        target: &HopTarget,
        timeout: Duration,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;
}
