//! Remote execution coordinator.
//!
//! Drives the full lifecycle of one diagnostic run: resolve the target,
//! bring up the hop chain (retrying transient failures with backoff),
//! execute the command batch in order, parse requested outputs, and tear
//! the chain down on every exit path.

mod result;

pub use result::{CommandOutcome, CommandResult};

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::chain::{self, Channel, EndpointDescriptor, TokenExchanger};
use crate::error::{Error, ParseError, Result, TransportError};
use crate::parser::ParserRegistry;
use crate::resolver::Resolver;
use crate::transport::{Session, Transport};

/// One command in a batch, optionally tagged with the output kind to
/// parse its result with.
#[derive(Debug, Clone)]
pub struct Command {
    /// Command text, sent as-is.
    pub text: String,

    /// Parser kind for the output; `None` leaves the output raw.
    pub output_kind: Option<String>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            output_kind: None,
        }
    }

    /// Request structured parsing of this command's output.
    pub fn output_kind(mut self, kind: impl Into<String>) -> Self {
        self.output_kind = Some(kind.into());
        self
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Tunables for one run. All timeouts are explicit; nothing blocks
/// indefinitely.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Bound on each hop's connect (TCP/tunnel + handshake + auth).
    pub connect_timeout: Duration,

    /// Bound on each command's execution.
    pub command_timeout: Duration,

    /// Additional chain-build attempts after the first, for transient
    /// failures only.
    pub max_retries: u32,

    /// Base delay for exponential backoff between attempts.
    pub retry_base_delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(15),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// Coordinates resolution, chain construction, execution, and parsing.
///
/// Holds no per-run state: every `run` owns its own channel, so one
/// coordinator may serve concurrent runs against different targets. The
/// resolver and registry are shared read-only.
pub struct Coordinator<T: Transport> {
    resolver: Arc<Resolver>,
    registry: Arc<ParserRegistry>,
    exchanger: Arc<dyn TokenExchanger>,
    transport: T,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(
        resolver: Arc<Resolver>,
        registry: Arc<ParserRegistry>,
        exchanger: Arc<dyn TokenExchanger>,
        transport: T,
    ) -> Self {
        Self {
            resolver,
            registry,
            exchanger,
            transport,
        }
    }

    /// Run `commands` on `target` through `hops`.
    ///
    /// Resolution failures and an unbuildable chain fail the whole run;
    /// per-command timeouts, execution failures, and parse failures are
    /// recorded in that command's result while the batch continues. The
    /// caller gets one result per requested command.
    pub async fn run(
        &self,
        target: &str,
        hops: &[&str],
        commands: &[Command],
        options: &RunOptions,
    ) -> Result<Vec<CommandResult>> {
        self.run_with_cancel(target, hops, commands, options, &CancellationToken::new())
            .await
    }

    /// Like [`run`](Self::run), but observes `cancel` between commands
    /// and during retry backoff. Cancellation is best-effort: a command
    /// already in flight runs to its own timeout, and a cancelled run
    /// returns the results collected so far.
    pub async fn run_with_cancel(
        &self,
        target: &str,
        hops: &[&str],
        commands: &[Command],
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<CommandResult>> {
        let descriptor = self.resolver.resolve(target, hops)?;

        // An unregistered kind is a configuration error; catch it before
        // opening a single connection.
        for command in commands {
            if let Some(kind) = &command.output_kind {
                if !self.registry.contains(kind) {
                    return Err(ParseError::UnknownKind { kind: kind.clone() }.into());
                }
            }
        }

        let channel = self.build_with_retry(&descriptor, options, cancel).await?;

        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            if cancel.is_cancelled() {
                warn!(
                    "run against '{target}' cancelled with {} of {} commands done",
                    results.len(),
                    commands.len()
                );
                break;
            }
            results.push(self.execute_one(&channel, command, options).await);
        }

        channel.close().await;

        info!(
            "run against '{target}' finished: {}/{} commands ok",
            results.iter().filter(|r| r.is_ok()).count(),
            results.len()
        );
        Ok(results)
    }

    /// Build the chain, retrying transient failures with exponential
    /// backoff. Fatal failures (resolution, rejected auth, non-transient
    /// token errors) surface immediately.
    async fn build_with_retry(
        &self,
        descriptor: &EndpointDescriptor,
        options: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<Channel<T::Session>> {
        let mut attempt: u32 = 0;
        loop {
            match chain::build_chain(
                &self.transport,
                self.exchanger.as_ref(),
                descriptor,
                options.connect_timeout,
            )
            .await
            {
                Ok(channel) => return Ok(channel),
                Err(e) if e.is_transient() && attempt < options.max_retries => {
                    let delay = options.retry_base_delay * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "chain build attempt {attempt} failed ({e}); retrying in {delay:?}"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(e),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute one command and fold every failure mode into its result.
    async fn execute_one(
        &self,
        channel: &Channel<T::Session>,
        command: &Command,
        options: &RunOptions,
    ) -> CommandResult {
        debug!("running '{}'", command.text);
        let start = Instant::now();

        let output = match channel
            .target()
            .execute(&command.text, options.command_timeout)
            .await
        {
            Ok(output) => output,
            Err(TransportError::Timeout(_)) => {
                warn!("'{}' timed out", command.text);
                return CommandResult {
                    command: command.text.clone(),
                    output: String::new(),
                    exit_status: None,
                    elapsed: start.elapsed(),
                    outcome: CommandOutcome::TimedOut,
                    records: Vec::new(),
                };
            }
            Err(e) => {
                warn!("'{}' failed: {e}", command.text);
                return CommandResult {
                    command: command.text.clone(),
                    output: String::new(),
                    exit_status: None,
                    elapsed: start.elapsed(),
                    outcome: CommandOutcome::ExecFailed(e.to_string()),
                    records: Vec::new(),
                };
            }
        };

        let elapsed = start.elapsed();

        if output.exit_status.is_some_and(|status| status != 0) {
            let message = if output.stderr.trim().is_empty() {
                format!("exit status {}", output.exit_status.unwrap_or(1))
            } else {
                output.stderr.trim().to_string()
            };
            return CommandResult {
                command: command.text.clone(),
                output: output.stdout,
                exit_status: output.exit_status,
                elapsed,
                outcome: CommandOutcome::ExecFailed(message),
                records: Vec::new(),
            };
        }

        let (outcome, records) = match &command.output_kind {
            None => (CommandOutcome::Ok, Vec::new()),
            Some(kind) => match self.registry.parse(kind, &output.stdout) {
                Ok(records) => (CommandOutcome::Ok, records),
                Err(e) => {
                    warn!("parse of '{}' as '{kind}' failed: {e}", command.text);
                    (CommandOutcome::ParseFailed(e.to_string()), Vec::new())
                }
            },
        };

        CommandResult {
            command: command.text.clone(),
            output: output.stdout,
            exit_status: output.exit_status,
            elapsed,
            outcome,
            records,
        }
    }
}
