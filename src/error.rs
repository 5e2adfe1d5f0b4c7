//! Error types for hoplink.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for hoplink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Target/hop resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Cloud-jumpbox token exchange errors
    #[error("Token exchange error: {0}")]
    Token(#[from] TokenError),

    /// Output parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Whether a failed chain build may be retried.
    ///
    /// Resolution failures, rejected authentication, and non-transient
    /// token failures are final; connection and timeout failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Resolve(_) | Error::Parse(_) => false,
            Error::Transport(e) => e.is_transient(),
            Error::Token(e) => e.is_transient(),
        }
    }
}

/// Endpoint/hop resolution errors (configuration lookups, never retried).
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The logical target name is not in the endpoint table
    #[error("Unknown target '{name}'")]
    UnknownTarget { name: String },

    /// A named hop in the chain is not in the endpoint table
    #[error("Unresolved hop '{name}'")]
    UnresolvedHop { name: String },
}

/// Transport layer errors (SSH connection, authentication, execution).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to reach the host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication rejected by the server
    #[error("Authentication rejected for user '{user}' on {host}")]
    AuthRejected { user: String, host: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key did not pass verification
    #[error("Host key rejected for {host}:{port}")]
    HostKeyRejected { host: String, port: u16 },

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Session already closed
    #[error("Session closed")]
    Closed,

    /// Command finished without reporting an exit status
    #[error("Command did not report an exit status")]
    NoExitStatus,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Connection and timeout failures are transient; everything tied to
    /// credentials or host identity is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionFailed { .. }
                | TransportError::Timeout(_)
                | TransportError::Io(_)
        )
    }
}

/// Cloud-jumpbox token exchange errors.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The exchange program could not be started
    #[error("Failed to run token exchange program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The exchange did not complete in time
    #[error("Token exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The exchange program refused the stored credentials
    #[error("Token exchange rejected: {message}")]
    Rejected { message: String },

    /// The exchange succeeded but produced no token
    #[error("Token exchange returned an empty token")]
    EmptyToken,
}

impl TokenError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TokenError::Spawn { .. } | TokenError::Timeout(_))
    }
}

/// Output parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// No parser is registered for the requested kind
    #[error("No parser registered for kind '{kind}'")]
    UnknownKind { kind: String },

    /// The output was malformed for this kind
    #[error("Malformed {kind} output: {message}")]
    Malformed { kind: String, message: String },

    /// The parser recognized nothing in non-empty output
    #[error("No {kind} fields found in output")]
    NoMatch { kind: String },
}

/// Result type alias using hoplink's Error.
pub type Result<T> = std::result::Result<T, Error>;
