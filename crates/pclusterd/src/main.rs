//! pclusterd - pcluster completion daemon
//!
//! Periodically lists clusters in every configured region and caches the
//! results for the tab-completion resolver.

use anyhow::Result;
use clap::Parser;
use pcluster_common::logging::{init_file_logging, init_stderr_logging};
use pcluster_common::{AutocompleterConfig, ClusterCacheStore, WrappedCli};
use pclusterd::RegionPoller;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pclusterd")]
#[command(about = "Cache pcluster cluster listings for tab completion", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/pcluster-autocompleter/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AutocompleterConfig::load_from(path),
        None => AutocompleterConfig::load(),
    };
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (AutocompleterConfig::default(), Some(e)),
    };

    if let Err(e) = init_file_logging(&config.daemon_log_path, config.log_max_bytes) {
        init_stderr_logging();
        warn!(
            "Could not open log file {}: {}; logging to stderr",
            config.daemon_log_path.display(),
            e
        );
    }
    if let Some(e) = config_error {
        warn!("{}; using default configuration", e);
    }

    info!("pclusterd v{} starting", env!("CARGO_PKG_VERSION"));

    let cli_handle = WrappedCli::new(
        config.cli_program.clone(),
        config.help_timeout(),
        config.list_timeout(),
    );
    let store = ClusterCacheStore::new(config.cache_path.clone());
    let mut poller = RegionPoller::new(
        cli_handle,
        store,
        config.regions.clone(),
        config.poll_interval(),
    );

    if cli.once {
        poller.poll_once().await;
        return Ok(());
    }

    tokio::select! {
        _ = poller.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
