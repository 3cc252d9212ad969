//! Command catalog discovery.
//!
//! The resolver only sees the [`CommandCatalog`] trait; [`HelpTextCatalog`]
//! is the implementation that scrapes the wrapped CLI's help output. Both
//! methods return an empty list when discovery fails.

use crate::help_parser::{parse_flags, parse_subcommands};
use async_trait::async_trait;
use pcluster_common::WrappedCli;
use pcluster_common::CompletionError;
use tracing::{debug, error, warn};

#[async_trait]
pub trait CommandCatalog {
    /// Top-level subcommands, in the order the CLI lists them
    async fn subcommands(&self) -> Vec<String>;

    /// Flags accepted by `subcommand`, in help-text order
    async fn flags(&self, subcommand: &str) -> Vec<String>;
}

/// Catalog rebuilt from `--help` output on every call
#[derive(Debug, Clone)]
pub struct HelpTextCatalog {
    cli: WrappedCli,
}

impl HelpTextCatalog {
    pub fn new(cli: WrappedCli) -> Self {
        Self { cli }
    }
}

#[async_trait]
impl CommandCatalog for HelpTextCatalog {
    async fn subcommands(&self) -> Vec<String> {
        let help = match self.cli.help().await {
            Ok(help) => help,
            Err(e) => {
                log_help_failure("top-level help", &e);
                return Vec::new();
            }
        };
        match parse_subcommands(&help) {
            Ok(commands) => commands,
            Err(e) => {
                debug!("`{} --help`: {}", self.cli.program(), e);
                Vec::new()
            }
        }
    }

    async fn flags(&self, subcommand: &str) -> Vec<String> {
        match self.cli.subcommand_help(subcommand).await {
            Ok(help) => parse_flags(&help),
            Err(e) => {
                log_help_failure(&format!("help for `{}`", subcommand), &e);
                Vec::new()
            }
        }
    }
}

/// A missing or hung CLI is expected on some hosts; anything else is a bug.
fn log_help_failure(what: &str, e: &CompletionError) {
    if e.is_subprocess_failure() {
        warn!("Could not fetch {}: {}", what, e);
    } else {
        error!("Could not fetch {}: {}", what, e);
    }
}
