//! Endpoint table: the externally supplied configuration mapping logical
//! names to addresses, credentials, and hop kinds.

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;

use crate::chain::TokenSource;

fn default_port() -> u16 {
    22
}

/// The whole endpoint table. Loaded once at startup from wherever the
/// caller keeps it (file, environment, inventory export) and injected
/// read-only.
#[derive(Debug, Deserialize, Default)]
pub struct EndpointTable {
    /// Logical target name -> device entry.
    #[serde(default)]
    pub targets: HashMap<String, TargetEntry>,

    /// Hop name -> bastion/jumpbox entry.
    #[serde(default)]
    pub hops: HashMap<String, HopEntry>,
}

/// One reachable device.
#[derive(Debug, Deserialize)]
pub struct TargetEntry {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    pub auth: AuthEntry,
}

/// One bastion or cloud jumpbox.
#[derive(Debug, Deserialize)]
pub struct HopEntry {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    #[serde(default)]
    pub kind: HopKindEntry,

    /// Static credentials; required for `ssh` hops.
    pub auth: Option<AuthEntry>,

    /// Token exchange; required for `cloud_jumpbox` hops.
    pub token: Option<TokenSource>,
}

/// Hop flavor as written in configuration.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HopKindEntry {
    #[default]
    Ssh,
    CloudJumpbox,
}

/// Credential entry. Secrets deserialize straight into `SecretString`
/// and never appear in Debug output.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum AuthEntry {
    Password { password: SecretString },
    Key {
        path: PathBuf,
        passphrase: Option<SecretString>,
    },
}
