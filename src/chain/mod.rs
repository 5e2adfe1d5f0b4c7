//! Hop chain construction and the multi-hop channel.
//!
//! A channel is the live, possibly multi-hop transport commands run
//! over. Building one walks the descriptor's hops in order: the first is
//! dialed directly, every later one is tunneled through the session
//! before it, and the device itself is the last link. Either the whole
//! chain comes up or nothing is returned; a failure partway tears down
//! the sessions already opened, in reverse, before it surfaces.

mod descriptor;
mod token;

pub use descriptor::{EndpointDescriptor, HopAuth, HopDescriptor, HopKind};
pub use token::{CliTokenExchanger, TokenExchanger, TokenSource};

use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::transport::{Session, SessionAuth, Transport};

/// A live chain of authenticated sessions; the last one reaches the
/// target device. Owns every session exclusively.
#[derive(Debug)]
pub struct Channel<S: Session> {
    /// Hop 0 first, target last. Emptied by `close`.
    sessions: Vec<S>,

    /// Path description, for logs.
    path: String,
}

impl<S: Session> Channel<S> {
    /// The session on the final target.
    ///
    /// # Panics
    ///
    /// Panics if the channel holds no sessions. [`build_chain`] always
    /// produces at least one (the target's), and `close` consumes the
    /// channel, so this cannot happen for a channel obtained from this
    /// module.
    pub fn target(&self) -> &S {
        self.sessions.last().expect("channel has no sessions")
    }

    /// Number of live sessions (hops + target).
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Close every session, innermost (target) first. Per-session close
    /// failures are logged and do not stop the teardown.
    pub async fn close(mut self) {
        debug!("closing channel {}", self.path);
        close_reverse(&mut self.sessions).await;
    }
}

impl<S: Session> Drop for Channel<S> {
    fn drop(&mut self) {
        if !self.sessions.is_empty() {
            warn!("channel {} dropped without close()", self.path);
        }
    }
}

/// Close sessions in reverse creation order, draining the vector.
async fn close_reverse<S: Session>(sessions: &mut Vec<S>) {
    while let Some(mut session) = sessions.pop() {
        if let Err(e) = session.close().await {
            warn!("error closing session during teardown: {e}");
        }
    }
}

/// Materialize a connected channel for `descriptor`.
///
/// Not retried internally; the coordinator decides whether a failure is
/// worth another attempt.
pub async fn build_chain<T: Transport>(
    transport: &T,
    exchanger: &dyn TokenExchanger,
    descriptor: &EndpointDescriptor,
    connect_timeout: Duration,
) -> Result<Channel<T::Session>> {
    let path = descriptor.path_description();
    debug!("building chain {path}");

    let mut sessions: Vec<T::Session> = Vec::with_capacity(descriptor.hops.len() + 1);

    for hop in descriptor.hops.iter().chain(std::iter::once(&descriptor.target)) {
        let auth = match &hop.auth {
            HopAuth::Static(auth) => auth.clone(),
            HopAuth::TokenExchange(source) => match exchanger.exchange(source).await {
                Ok(tok) => SessionAuth::Token(tok),
                Err(e) => {
                    close_reverse(&mut sessions).await;
                    return Err(e.into());
                }
            },
        };

        let target = hop.to_target(auth);
        let connected = match sessions.last() {
            None => transport.connect(&target, connect_timeout).await,
            Some(parent) => transport.connect_via(parent, &target, connect_timeout).await,
        };

        match connected {
            Ok(session) => sessions.push(session),
            Err(e) => {
                warn!("chain {path} failed at hop '{}': {e}", hop.name);
                close_reverse(&mut sessions).await;
                return Err(Error::Transport(e));
            }
        }
    }

    info!("chain up: {path} ({} sessions)", sessions.len());
    Ok(Channel { sessions, path })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use super::*;
    use crate::error::TokenError;

    /// Exchanger double: optionally fails the first N calls with a
    /// transient error, then hands out a fixed token.
    pub(crate) struct FakeExchanger {
        pub calls: AtomicU32,
        fail_first: Mutex<u32>,
    }

    impl FakeExchanger {
        pub fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: Mutex::new(0),
            }
        }

        pub fn fail_first(n: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                fail_first: Mutex::new(n),
            }
        }

        pub fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenExchanger for FakeExchanger {
        async fn exchange(
            &self,
            _source: &TokenSource,
        ) -> std::result::Result<SecretString, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut remaining = self.fail_first.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TokenError::Timeout(Duration::from_millis(1)));
            }
            Ok(SecretString::from("tok-test".to_string()))
        }
    }

    /// A plain password-auth hop for tests.
    pub(crate) fn ssh_hop(name: &str) -> HopDescriptor {
        HopDescriptor {
            name: name.to_string(),
            host: name.to_string(),
            port: 22,
            username: "neteng".to_string(),
            kind: HopKind::Ssh,
            auth: HopAuth::Static(SessionAuth::Password(SecretString::from(
                "secret".to_string(),
            ))),
        }
    }

    /// A cloud-jumpbox hop for tests.
    pub(crate) fn cloud_hop(name: &str) -> HopDescriptor {
        HopDescriptor {
            name: name.to_string(),
            host: name.to_string(),
            port: 22,
            username: "neteng".to_string(),
            kind: HopKind::CloudJumpbox,
            auth: HopAuth::TokenExchange(TokenSource {
                program: "exchange".to_string(),
                args: vec![],
            }),
        }
    }

    pub(crate) fn descriptor(target: &str, hops: &[&str]) -> EndpointDescriptor {
        EndpointDescriptor {
            name: target.to_string(),
            hops: hops.iter().map(|h| ssh_hop(h)).collect(),
            target: ssh_hop(target),
        }
    }
}
