//! Credential and endpoint resolution.
//!
//! Turns a logical target name plus an ordered list of hop names into a
//! fully resolved [`EndpointDescriptor`]. Pure lookup against the
//! injected endpoint table; no I/O, no side effects.

mod table;

pub use table::{AuthEntry, EndpointTable, HopEntry, HopKindEntry, TargetEntry};

use crate::chain::{EndpointDescriptor, HopAuth, HopDescriptor, HopKind};
use crate::error::ResolveError;
use crate::transport::SessionAuth;

/// Resolves logical names against a read-only endpoint table.
#[derive(Debug)]
pub struct Resolver {
    table: EndpointTable,
}

impl Resolver {
    pub fn new(table: EndpointTable) -> Self {
        Self { table }
    }

    /// Resolve `target` reached through `hops` (in order; empty means a
    /// direct connection).
    pub fn resolve(
        &self,
        target: &str,
        hops: &[&str],
    ) -> Result<EndpointDescriptor, ResolveError> {
        let entry =
            self.table
                .targets
                .get(target)
                .ok_or_else(|| ResolveError::UnknownTarget {
                    name: target.to_string(),
                })?;

        let mut hop_descriptors = Vec::with_capacity(hops.len());
        for name in hops {
            hop_descriptors.push(self.resolve_hop(name)?);
        }

        Ok(EndpointDescriptor {
            name: target.to_string(),
            hops: hop_descriptors,
            target: HopDescriptor {
                name: target.to_string(),
                host: entry.host.clone(),
                port: entry.port,
                username: entry.username.clone(),
                kind: HopKind::Ssh,
                auth: HopAuth::Static(auth_to_session(&entry.auth)),
            },
        })
    }

    fn resolve_hop(&self, name: &str) -> Result<HopDescriptor, ResolveError> {
        let entry = self
            .table
            .hops
            .get(name)
            .ok_or_else(|| ResolveError::UnresolvedHop {
                name: name.to_string(),
            })?;

        // An entry missing the material its kind needs cannot be
        // resolved into a dialable hop.
        let (kind, auth) = match entry.kind {
            HopKindEntry::Ssh => match &entry.auth {
                Some(auth) => (HopKind::Ssh, HopAuth::Static(auth_to_session(auth))),
                None => {
                    return Err(ResolveError::UnresolvedHop {
                        name: name.to_string(),
                    });
                }
            },
            HopKindEntry::CloudJumpbox => match &entry.token {
                Some(token) => (HopKind::CloudJumpbox, HopAuth::TokenExchange(token.clone())),
                None => {
                    return Err(ResolveError::UnresolvedHop {
                        name: name.to_string(),
                    });
                }
            },
        };

        Ok(HopDescriptor {
            name: name.to_string(),
            host: entry.host.clone(),
            port: entry.port,
            username: entry.username.clone(),
            kind,
            auth,
        })
    }
}

fn auth_to_session(entry: &AuthEntry) -> SessionAuth {
    match entry {
        AuthEntry::Password { password } => SessionAuth::Password(password.clone()),
        AuthEntry::Key { path, passphrase } => SessionAuth::PrivateKey {
            path: path.clone(),
            passphrase: passphrase.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EndpointTable {
        serde_json::from_value(serde_json::json!({
            "targets": {
                "edge-router-1": {
                    "host": "10.0.4.2",
                    "username": "neteng",
                    "auth": { "method": "password", "password": "hunter2" }
                }
            },
            "hops": {
                "bastion-a": {
                    "host": "bastion-a.example.net",
                    "username": "neteng",
                    "auth": { "method": "password", "password": "hunter2" }
                },
                "cloud-jumpbox": {
                    "host": "jumphost-group-6184.internal",
                    "username": "neteng",
                    "kind": "cloud_jumpbox",
                    "token": { "program": "cloudctl", "args": ["auth", "print-token"] }
                },
                "broken-cloud": {
                    "host": "jumphost.internal",
                    "username": "neteng",
                    "kind": "cloud_jumpbox"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolves_direct_target() {
        let resolver = Resolver::new(table());
        let desc = resolver.resolve("edge-router-1", &[]).unwrap();
        assert_eq!(desc.hop_count(), 0);
        assert_eq!(desc.target.host, "10.0.4.2");
        assert_eq!(desc.target.port, 22);
    }

    #[test]
    fn resolves_hop_chain_in_order() {
        let resolver = Resolver::new(table());
        let desc = resolver
            .resolve("edge-router-1", &["bastion-a", "cloud-jumpbox"])
            .unwrap();
        assert_eq!(desc.hop_count(), 2);
        assert_eq!(desc.hops[0].name, "bastion-a");
        assert_eq!(desc.hops[0].kind, HopKind::Ssh);
        assert_eq!(desc.hops[1].kind, HopKind::CloudJumpbox);
        assert!(matches!(desc.hops[1].auth, HopAuth::TokenExchange(_)));
    }

    #[test]
    fn unknown_target_errors() {
        let resolver = Resolver::new(table());
        let err = resolver.resolve("no-such-device", &[]).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownTarget { name } if name == "no-such-device"));
    }

    #[test]
    fn unknown_hop_errors() {
        let resolver = Resolver::new(table());
        let err = resolver
            .resolve("edge-router-1", &["no-such-hop"])
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedHop { name } if name == "no-such-hop"));
    }

    #[test]
    fn cloud_hop_without_token_source_is_unresolved() {
        let resolver = Resolver::new(table());
        let err = resolver
            .resolve("edge-router-1", &["broken-cloud"])
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedHop { name } if name == "broken-cloud"));
    }
}
