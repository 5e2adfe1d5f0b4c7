//! Cloud-jumpbox token exchange.
//!
//! A cloud jumpbox does not take static credentials; stored credentials
//! are first exchanged out-of-band for a short-lived session token, and
//! that token is presented to the hop as a one-shot passcode.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::TokenError;

/// Describes the out-of-band exchange for one cloud-jumpbox hop: the
/// program to run and the arguments carrying the client identity.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSource {
    /// Exchange program, e.g. the cloud provider CLI.
    pub program: String,

    /// Arguments, including the client identity and API endpoint.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Exchanges stored credentials for a short-lived session token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self, source: &TokenSource) -> Result<SecretString, TokenError>;
}

/// Production exchanger: runs the configured program and takes its
/// trimmed stdout as the token.
#[derive(Debug, Clone)]
pub struct CliTokenExchanger {
    /// Bound on the whole exchange.
    pub timeout: Duration,
}

impl Default for CliTokenExchanger {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
impl TokenExchanger for CliTokenExchanger {
    async fn exchange(&self, source: &TokenSource) -> Result<SecretString, TokenError> {
        debug!("exchanging credentials for token via '{}'", source.program);

        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&source.program)
                .args(&source.args)
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| TokenError::Timeout(self.timeout))?
        .map_err(|source_err| TokenError::Spawn {
            program: source.program.clone(),
            source: source_err,
        })?;

        if !output.status.success() {
            return Err(TokenError::Rejected {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(TokenError::EmptyToken);
        }

        Ok(SecretString::from(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn cli_exchange_trims_stdout() {
        let exchanger = CliTokenExchanger::default();
        let source = TokenSource {
            program: "echo".to_string(),
            args: vec!["tok-123".to_string()],
        };
        let token = exchanger.exchange(&source).await.unwrap();
        assert_eq!(token.expose_secret(), "tok-123");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let exchanger = CliTokenExchanger::default();
        let source = TokenSource {
            program: "hoplink-no-such-program".to_string(),
            args: vec![],
        };
        let err = exchanger.exchange(&source).await.unwrap_err();
        assert!(matches!(err, TokenError::Spawn { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn failing_program_is_rejected() {
        let exchanger = CliTokenExchanger::default();
        let source = TokenSource {
            program: "false".to_string(),
            args: vec![],
        };
        let err = exchanger.exchange(&source).await.unwrap_err();
        assert!(matches!(err, TokenError::Rejected { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn empty_stdout_is_empty_token() {
        let exchanger = CliTokenExchanger::default();
        let source = TokenSource {
            program: "true".to_string(),
            args: vec![],
        };
        let err = exchanger.exchange(&source).await.unwrap_err();
        assert!(matches!(err, TokenError::EmptyToken));
    }
}
