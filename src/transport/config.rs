//! Connection target and transport configuration.

use std::path::PathBuf;

use secrecy::SecretString;

/// Authentication material for one session.
#[derive(Debug, Clone)]
pub enum SessionAuth {
    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },

    /// A short-lived token from a cloud-jumpbox exchange, presented to
    /// the server as a one-shot passcode.
    Token(SecretString),
}

/// A fully resolved connection target: where to dial and how to log in.
#[derive(Debug, Clone)]
pub struct HopTarget {
    /// Hostname or IP address.
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Login username.
    pub username: String,

    /// Authentication material.
    pub auth: SessionAuth,
}

impl HopTarget {
    /// Short `user@host:port` label for logs.
    pub fn label(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Host key verification policy.
#[derive(Debug, Clone, Default)]
pub enum HostKeyPolicy {
    /// Accept every host key without checking. Bastions and devices on
    /// managed networks churn keys constantly; this is the operational
    /// default here.
    #[default]
    AcceptAll,

    /// Check against known_hosts, auto-learning unknown keys but
    /// rejecting changed ones.
    KnownHosts,
}

/// Configuration for the russh-backed transport.
#[derive(Debug, Clone, Default)]
pub struct SshTransportConfig {
    /// Host key verification policy.
    pub host_key_policy: HostKeyPolicy,

    /// Alternate known_hosts file; `None` uses the user default.
    pub known_hosts_path: Option<PathBuf>,
}
