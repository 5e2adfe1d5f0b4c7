//! # Hoplink
//!
//! Async multi-hop SSH command execution for network diagnostics.
//!
//! Hoplink reaches network devices that hide behind one or more bastion
//! hosts, runs diagnostic commands on them, and turns the raw CLI output
//! into structured records. Each hop in the chain is tunneled through the
//! previous one; a cloud jumpbox hop exchanges stored credentials for a
//! short-lived token before it is dialed.
//!
//! ## Features
//!
//! - Async SSH via russh, including SSH-over-SSH hop nesting
//! - One chain-building algorithm for plain bastions and cloud jumpboxes
//! - Retry with exponential backoff on transient connect failures
//! - Per-command timeouts that never abort the rest of the batch
//! - Pluggable output parsers keyed by kind, with built-in vendor parsers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hoplink::{
//!     CliTokenExchanger, Command, Coordinator, EndpointTable, ParserRegistry,
//!     Resolver, RunOptions, SshTransport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table: EndpointTable =
//!         serde_json::from_str(&std::fs::read_to_string("endpoints.json")?)?;
//!
//!     let coordinator = Coordinator::new(
//!         Arc::new(Resolver::new(table)),
//!         Arc::new(ParserRegistry::with_builtins()),
//!         Arc::new(CliTokenExchanger::default()),
//!         SshTransport::default(),
//!     );
//!
//!     let results = coordinator
//!         .run(
//!             "edge-router-1",
//!             &["bastion-a"],
//!             &[Command::new("show version").output_kind("cisco_ios.version")],
//!             &RunOptions::default(),
//!         )
//!         .await?;
//!
//!     for result in &results {
//!         println!("{}: {:?}", result.command, result.outcome);
//!     }
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod runner;
pub mod transport;

// Re-export main types for convenience
pub use chain::{
    Channel, CliTokenExchanger, EndpointDescriptor, HopDescriptor, HopKind, TokenExchanger,
    TokenSource,
};
pub use error::{Error, ParseError, ResolveError, Result, TokenError, TransportError};
pub use parser::{ParsedRecord, ParserRegistry};
pub use resolver::{EndpointTable, Resolver};
pub use runner::{Command, CommandOutcome, CommandResult, Coordinator, RunOptions};
pub use transport::{ExecOutput, Session, SessionAuth, SshTransport, Transport};
