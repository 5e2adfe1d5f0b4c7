//! Resolved endpoint and hop descriptors.

use super::token::TokenSource;
use crate::transport::{HopTarget, SessionAuth};

/// What flavor of hop this is; the chain builder branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopKind {
    /// Plain SSH bastion with static credentials.
    Ssh,

    /// Cloud jumpbox: stored credentials are exchanged for a short-lived
    /// token before the tunnel connect.
    CloudJumpbox,
}

/// How a hop authenticates.
#[derive(Debug, Clone)]
pub enum HopAuth {
    /// Static credentials, usable as-is.
    Static(SessionAuth),

    /// Credentials must first be exchanged for a session token.
    TokenExchange(TokenSource),
}

/// One resolved hop (or the final target). Read-only after resolution.
#[derive(Debug, Clone)]
pub struct HopDescriptor {
    /// Logical name from the endpoint table.
    pub name: String,

    /// Resolved address.
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Login username.
    pub username: String,

    /// Hop flavor.
    pub kind: HopKind,

    /// Authentication.
    pub auth: HopAuth,
}

impl HopDescriptor {
    /// Pair this hop with concrete authentication material to form a
    /// dialable target.
    pub(crate) fn to_target(&self, auth: SessionAuth) -> HopTarget {
        HopTarget {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            auth,
        }
    }
}

/// A resolved execution target: the device itself plus the ordered hops
/// in front of it. Immutable; created per execution request.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// Logical target name.
    pub name: String,

    /// Intermediate hops, outermost first. Empty means direct.
    pub hops: Vec<HopDescriptor>,

    /// The final device.
    pub target: HopDescriptor,
}

impl EndpointDescriptor {
    /// Number of intermediate hops.
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// `bastion-a -> bastion-b -> device`, for logs.
    pub fn path_description(&self) -> String {
        let mut parts: Vec<&str> = self.hops.iter().map(|h| h.name.as_str()).collect();
        parts.push(self.target.name.as_str());
        parts.join(" -> ")
    }
}
