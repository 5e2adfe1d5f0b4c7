//! Scripted in-memory transport for exercising chain and runner logic.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::config::HopTarget;
use super::{ExecOutput, Session, Transport};
use crate::error::TransportError;

/// Scripted behavior for one command.
#[derive(Debug, Clone)]
pub(crate) enum FakeExec {
    Output(ExecOutput),
    TimeOut,
    Fail(String),
}

/// Shared observable state, kept outside the transport so tests can hold
/// a handle after moving the transport into a coordinator.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// Every connect attempt in order, including failed ones.
    pub attempts: Mutex<Vec<String>>,
    /// Successful opens in order.
    pub opened: Mutex<Vec<String>>,
    /// Closes in order.
    pub closed: Mutex<Vec<String>>,
    /// Host -> remaining connect attempts to fail transiently.
    fail_remaining: Mutex<HashMap<String, u32>>,
    /// Hosts that reject authentication outright.
    auth_reject: Mutex<Vec<String>>,
    /// Command text -> scripted behavior; unscripted commands echo.
    scripts: Mutex<HashMap<String, FakeExec>>,
}

impl FakeState {
    pub fn attempts_for(&self, host: &str) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.as_str() == host)
            .count()
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    pub state: Arc<FakeState>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` connect attempts to `host` with a
    /// transient connection error.
    pub fn fail_connects(&self, host: &str, count: u32) {
        self.state
            .fail_remaining
            .lock()
            .unwrap()
            .insert(host.to_string(), count);
    }

    /// Reject authentication for `host` on every attempt.
    pub fn reject_auth(&self, host: &str) {
        self.state.auth_reject.lock().unwrap().push(host.to_string());
    }

    /// Script the behavior of a command on the target session.
    pub fn script(&self, command: &str, exec: FakeExec) {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert(command.to_string(), exec);
    }

    /// Script successful output with exit status 0.
    pub fn script_output(&self, command: &str, stdout: &str) {
        self.script(
            command,
            FakeExec::Output(ExecOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_status: Some(0),
            }),
        );
    }

    fn try_open(&self, target: &HopTarget) -> Result<FakeSession, TransportError> {
        let host = target.host.clone();
        self.state.attempts.lock().unwrap().push(host.clone());

        {
            let mut failing = self.state.fail_remaining.lock().unwrap();
            if let Some(remaining) = failing.get_mut(&host) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransportError::ConnectionFailed {
                        host,
                        port: target.port,
                        source: io::Error::from(io::ErrorKind::ConnectionRefused),
                    });
                }
            }
        }

        if self.state.auth_reject.lock().unwrap().contains(&host) {
            return Err(TransportError::AuthRejected {
                user: target.username.clone(),
                host,
            });
        }

        self.state.opened.lock().unwrap().push(host.clone());
        Ok(FakeSession {
            host,
            state: self.state.clone(),
            closed: false,
        })
    }
}

impl Transport for FakeTransport {
    type Session = FakeSession;

    async fn connect(
        &self,
        target: &HopTarget,
        _timeout: Duration,
    ) -> Result<FakeSession, TransportError> {
        self.try_open(target)
    }

    async fn connect_via(
        &self,
        via: &FakeSession,
        target: &HopTarget,
        _timeout: Duration,
    ) -> Result<FakeSession, TransportError> {
        assert!(!via.closed, "tunnel requested through a closed session");
        self.try_open(target)
    }
}

#[derive(Debug)]
pub(crate) struct FakeSession {
    pub host: String,
    state: Arc<FakeState>,
    closed: bool,
}

impl Session for FakeSession {
    async fn execute(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError> {
        assert!(!self.closed, "execute on a closed session");
        let script = self.state.scripts.lock().unwrap().get(command).cloned();
        match script {
            Some(FakeExec::Output(output)) => Ok(output),
            Some(FakeExec::TimeOut) => Err(TransportError::Timeout(timeout)),
            Some(FakeExec::Fail(message)) => Ok(ExecOutput {
                stdout: String::new(),
                stderr: message,
                exit_status: Some(1),
            }),
            None => Ok(ExecOutput {
                stdout: format!("ran {command}"),
                stderr: String::new(),
                exit_status: Some(0),
            }),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.closed {
            self.closed = true;
            self.state.closed.lock().unwrap().push(self.host.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SessionAuth;
    use secrecy::SecretString;

    fn target(host: &str) -> HopTarget {
        HopTarget {
            host: host.to_string(),
            port: 22,
            username: "neteng".to_string(),
            auth: SessionAuth::Password(SecretString::from("secret".to_string())),
        }
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let transport = FakeTransport::new();
        let mut session = transport
            .connect(&target("bastion-a"), Duration::from_secs(1))
            .await
            .unwrap();

        session.close().await.unwrap();
        // A second close is an Ok no-op and records nothing new.
        session.close().await.unwrap();

        assert_eq!(*transport.state.closed.lock().unwrap(), vec!["bastion-a"]);
    }
}
