//! Invoking the wrapped `pcluster` CLI.
//!
//! Every invocation runs under an explicit timeout; on expiry the child is
//! killed and the call fails with [`CompletionError::Timeout`].

use crate::error::{CompletionError, Result};
use crate::listing::{parse_listing_output, ParsedListing};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Source of per-region cluster listings
#[async_trait]
pub trait ClusterLister {
    async fn list_clusters(&self, region: &str) -> Result<ParsedListing>;
}

/// Handle on the wrapped CLI binary
#[derive(Debug, Clone)]
pub struct WrappedCli {
    program: String,
    help_timeout: Duration,
    list_timeout: Duration,
}

impl WrappedCli {
    pub fn new(program: impl Into<String>, help_timeout: Duration, list_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            help_timeout,
            list_timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// `<cli> --help`
    pub async fn help(&self) -> Result<String> {
        self.run(&["--help"], self.help_timeout).await
    }

    /// `<cli> <subcommand> --help`
    pub async fn subcommand_help(&self, subcommand: &str) -> Result<String> {
        self.run(&[subcommand, "--help"], self.help_timeout).await
    }

    /// `<cli> list --region <region>`, raw stdout
    pub async fn list(&self, region: &str) -> Result<String> {
        self.run(&["list", "--region", region], self.list_timeout).await
    }

    /// Run the CLI with `args`, returning stdout decoded as text.
    pub async fn run(&self, args: &[&str], limit: Duration) -> Result<String> {
        let command_line = format!("{} {}", self.program, args.join(" "));
        let start = Instant::now();
        debug!("Executing: {}", command_line);

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CompletionError::Subprocess {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(CompletionError::Subprocess {
                    command: command_line,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(CompletionError::Timeout {
                    command: command_line,
                    secs: limit.as_secs(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompletionError::Subprocess {
                command: command_line,
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        debug!(
            "`{}` finished in {}ms",
            command_line,
            start.elapsed().as_millis()
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ClusterLister for WrappedCli {
    async fn list_clusters(&self, region: &str) -> Result<ParsedListing> {
        let output = self.list(region).await?;
        Ok(parse_listing_output(&output))
    }
}
