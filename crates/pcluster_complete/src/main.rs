//! pcluster_autocompleter - tab-completion candidates for `pcluster`
//!
//! Invoked by the shell on every completion request. Prints one candidate per
//! line and always exits 0, even when it has nothing to offer.

use clap::Parser;
use pcluster_common::logging::init_file_logging;
use pcluster_common::AutocompleterConfig;
use pcluster_complete::CompletionResolver;
use std::io::{self, Write};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "pcluster_autocompleter")]
#[command(about = "Get tab-completion candidates for a pcluster command", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// The pcluster subcommand and the arguments typed after it so far
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    subcommand_plus_args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let Ok(cli) = Cli::try_parse() else {
        return;
    };

    let (config, config_error) = match AutocompleterConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AutocompleterConfig::default(), Some(e)),
    };
    // stdout belongs to the shell, so no logging at all if the file is unusable
    let _ = init_file_logging(&config.resolver_log_path, config.log_max_bytes);
    if let Some(e) = config_error {
        warn!("{}; using default configuration", e);
    }
    debug!("pcluster completion script starting: {:?}", cli.subcommand_plus_args);

    let candidates = CompletionResolver::from_config(&config)
        .complete(&cli.subcommand_plus_args)
        .await;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for candidate in &candidates {
        if writeln!(out, "{}", candidate).is_err() {
            break;
        }
    }
    let _ = out.flush();
}
