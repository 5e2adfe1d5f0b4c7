//! russh-backed transport implementation.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use secrecy::ExposeSecret;

use super::config::{HopTarget, HostKeyPolicy, SessionAuth, SshTransportConfig};
use super::{ExecOutput, Session, Transport};
use crate::error::TransportError;

/// SSH transport wrapping the russh client.
#[derive(Debug, Clone, Default)]
pub struct SshTransport {
    config: SshTransportConfig,
}

impl SshTransport {
    pub fn new(config: SshTransportConfig) -> Self {
        Self { config }
    }

    fn handler_for(
        &self,
        target: &HopTarget,
    ) -> (SshHandler, Arc<Mutex<Option<TransportError>>>) {
        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            host: target.host.clone(),
            port: target.port,
            policy: self.config.host_key_policy.clone(),
            known_hosts_path: self.config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };
        (handler, host_key_error)
    }

    /// Map a failed `client::connect`/`connect_stream` into our taxonomy,
    /// preferring a detailed host-key error stored by the handler over
    /// the generic russh rejection.
    fn map_connect_error(
        error: russh::Error,
        target: &HopTarget,
        host_key_error: &Mutex<Option<TransportError>>,
    ) -> TransportError {
        if let Some(hk_err) = host_key_error.lock().unwrap().take() {
            return hk_err;
        }
        match error {
            russh::Error::IO(source) => TransportError::ConnectionFailed {
                host: target.host.clone(),
                port: target.port,
                source,
            },
            other => TransportError::Ssh(other),
        }
    }

    /// Authenticate an established handle.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        target: &HopTarget,
    ) -> Result<(), TransportError> {
        let success = match &target.auth {
            // A jumpbox token is a passcode from the server's point of
            // view; it rides the password method.
            SessionAuth::Password(secret) | SessionAuth::Token(secret) => session
                .authenticate_password(&target.username, secret.expose_secret())
                .await?
                .success(),
            SessionAuth::PrivateKey { path, passphrase } => {
                let key = load_secret_key(
                    path,
                    passphrase.as_ref().map(|p| p.expose_secret()),
                )
                .map_err(|e| TransportError::Key(e.to_string()))?;

                let hash_alg = session.best_supported_rsa_hash().await?.flatten();

                session
                    .authenticate_publickey(
                        &target.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await?
                    .success()
            }
        };

        if !success {
            return Err(TransportError::AuthRejected {
                user: target.username.clone(),
                host: target.host.clone(),
            });
        }

        Ok(())
    }
}

impl Transport for SshTransport {
    type Session = SshSession;

    async fn connect(
        &self,
        target: &HopTarget,
        timeout: Duration,
    ) -> Result<SshSession, TransportError> {
        debug!("connecting to {}", target.label());

        let ssh_config = Arc::new(client::Config::default());
        let (handler, host_key_error) = self.handler_for(target);

        let mut session = tokio::time::timeout(
            timeout,
            client::connect(ssh_config, (target.host.as_str(), target.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
        .map_err(|e| Self::map_connect_error(e, target, &host_key_error))?;

        tokio::time::timeout(timeout, Self::authenticate(&mut session, target))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;

        debug!("connected to {}", target.label());
        Ok(SshSession {
            handle: Some(session),
            label: target.label(),
        })
    }

    async fn connect_via(
        &self,
        via: &SshSession,
        target: &HopTarget,
        timeout: Duration,
    ) -> Result<SshSession, TransportError> {
        debug!("tunneling to {} via {}", target.label(), via.label);

        let parent = via.handle.as_ref().ok_or(TransportError::Closed)?;

        // Port-forward-style nesting: a direct-tcpip channel through the
        // parent becomes the byte stream a fresh SSH handshake runs over.
        let channel = tokio::time::timeout(
            timeout,
            parent.channel_open_direct_tcpip(
                target.host.as_str(),
                u32::from(target.port),
                "127.0.0.1",
                0,
            ),
        )
        .await
        .map_err(|_| TransportError::Timeout(timeout))??;

        let stream = channel.into_stream();

        let ssh_config = Arc::new(client::Config::default());
        let (handler, host_key_error) = self.handler_for(target);

        let mut session = tokio::time::timeout(
            timeout,
            client::connect_stream(ssh_config, stream, handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(timeout))?
        .map_err(|e| Self::map_connect_error(e, target, &host_key_error))?;

        tokio::time::timeout(timeout, Self::authenticate(&mut session, target))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;

        debug!("tunneled to {}", target.label());
        Ok(SshSession {
            handle: Some(session),
            label: target.label(),
        })
    }
}

/// One authenticated russh session.
pub struct SshSession {
    /// `None` once closed.
    handle: Option<Handle<SshHandler>>,

    /// `user@host:port`, for logs.
    label: String,
}

impl Session for SshSession {
    async fn execute(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError> {
        let handle = self.handle.as_ref().ok_or(TransportError::Closed)?;

        tokio::time::timeout(timeout, run_exec(handle, command))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(handle) = self.handle.take() {
            debug!("closing session to {}", self.label);
            handle
                .disconnect(russh::Disconnect::ByApplication, "", "en")
                .await?;
        }
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("session to {} dropped without close()", self.label);
        }
    }
}

/// Open an exec channel, run the command, and drain it.
async fn run_exec(
    handle: &Handle<SshHandler>,
    command: &str,
) -> Result<ExecOutput, TransportError> {
    let mut channel = handle.channel_open_session().await?;
    channel.exec(true, command).await?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut exit_status = None;

    // An ExitStatus message does not end the channel; data can trail it.
    // Drain until the channel itself closes.
    while let Some(msg) = channel.wait().await {
        match msg {
            russh::ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            russh::ChannelMsg::ExtendedData { ref data, ext } => {
                if ext == 1 {
                    stderr.extend_from_slice(data);
                }
            }
            russh::ChannelMsg::ExitStatus { exit_status: status } => {
                exit_status = Some(status);
            }
            _ => {}
        }
    }

    Ok(ExecOutput {
        stdout: String::from_utf8_lossy(&stdout).to_string(),
        stderr: String::from_utf8_lossy(&stderr).to_string(),
        exit_status,
    })
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts_path: Option<PathBuf>,
    /// Stores a detailed host-key error so connect() can surface it
    /// instead of the generic russh rejection.
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Check against known_hosts, learning unknown keys.
    fn check_and_learn(&self, pubkey: &PublicKey) -> Result<bool, TransportError> {
        let known = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        }
        .map_err(|_| TransportError::HostKeyRejected {
            host: self.host.clone(),
            port: self.port,
        })?;

        if !known {
            let learned = if let Some(ref path) = self.known_hosts_path {
                russh::keys::known_hosts::learn_known_hosts_path(
                    &self.host, self.port, pubkey, path,
                )
            } else {
                russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
            };
            if let Err(e) = learned {
                warn!("failed to save host key for {}: {}", self.host, e);
            }
        }

        Ok(true)
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        match self.policy {
            HostKeyPolicy::AcceptAll => Ok(true),
            HostKeyPolicy::KnownHosts => match self.check_and_learn(server_public_key) {
                Ok(accepted) => Ok(accepted),
                Err(e) => {
                    // Key changed; store the detailed error and reject.
                    *self.host_key_error.lock().unwrap() = Some(e);
                    Ok(false)
                }
            },
        }
    }
}
