//! Configuration for the daemon and the completion resolver.
//!
//! Loads settings from $PCLUSTER_AUTOCOMPLETER_CONFIG, else
//! ~/.config/pcluster-autocompleter/config.toml, else uses defaults.

use crate::error::{CompletionError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PCLUSTER_AUTOCOMPLETER_CONFIG";

/// Config file location relative to the user config dir
const CONFIG_RELATIVE_PATH: &str = "pcluster-autocompleter/config.toml";

/// How the resolver fills an absent cache on first use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapMode {
    /// Write a fixed placeholder set; never spawns the wrapped CLI
    #[default]
    Placeholder,
    /// List the resolved region once, falling back to the placeholder
    Live,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleterConfig {
    /// Wrapped CLI program name or path
    #[serde(default = "default_cli_program")]
    pub cli_program: String,

    /// Cluster cache snapshot file
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    #[serde(default = "default_daemon_log_path")]
    pub daemon_log_path: PathBuf,

    #[serde(default = "default_resolver_log_path")]
    pub resolver_log_path: PathBuf,

    /// Log file size at which it is rotated
    #[serde(default = "default_log_max_bytes")]
    pub log_max_bytes: u64,

    /// Regions the daemon polls, in order
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Timeout for `--help` invocations (interactive path)
    #[serde(default = "default_help_timeout")]
    pub help_timeout_secs: u64,

    /// Timeout for one region's `list` invocation
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,

    /// Region used when neither flag, environment nor config file name one
    #[serde(default = "default_region")]
    pub default_region: String,

    #[serde(default = "default_region_env_var")]
    pub region_env_var: String,

    /// The wrapped CLI's own config file, consulted for its region setting
    #[serde(default = "default_wrapped_config_path")]
    pub wrapped_config_path: Option<PathBuf>,

    #[serde(default)]
    pub bootstrap: BootstrapMode,
}

fn default_cli_program() -> String {
    "pcluster".to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("/tmp/pcluster-completions-daemon-cache.json")
}

fn default_daemon_log_path() -> PathBuf {
    PathBuf::from("/tmp/pcluster-completions-daemon-log.txt")
}

fn default_resolver_log_path() -> PathBuf {
    PathBuf::from("/tmp/pcluster-completions-log.txt")
}

fn default_log_max_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_regions() -> Vec<String> {
    ["eu-west-1", "eu-west-2", "us-east-1", "us-east-2", "us-west-1", "us-west-2"]
        .iter()
        .map(|r| r.to_string())
        .collect()
}

fn default_poll_interval() -> u64 {
    600 // every 10 minutes
}

fn default_help_timeout() -> u64 {
    5
}

fn default_list_timeout() -> u64 {
    120
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_region_env_var() -> String {
    "AWS_DEFAULT_REGION".to_string()
}

fn default_wrapped_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parallelcluster").join("config"))
}

impl Default for AutocompleterConfig {
    fn default() -> Self {
        Self {
            cli_program: default_cli_program(),
            cache_path: default_cache_path(),
            daemon_log_path: default_daemon_log_path(),
            resolver_log_path: default_resolver_log_path(),
            log_max_bytes: default_log_max_bytes(),
            regions: default_regions(),
            poll_interval_secs: default_poll_interval(),
            help_timeout_secs: default_help_timeout(),
            list_timeout_secs: default_list_timeout(),
            default_region: default_region(),
            region_env_var: default_region_env_var(),
            wrapped_config_path: default_wrapped_config_path(),
            bootstrap: BootstrapMode::default(),
        }
    }
}

impl AutocompleterConfig {
    /// Where the config file is looked up when none is given explicitly
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(CONFIG_RELATIVE_PATH))
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults; an unreadable or
    /// invalid one is an error so the caller can log it.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CompletionError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cli_program.trim().is_empty() {
            return Err(CompletionError::Config("cli_program is empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(CompletionError::Config(
                "poll_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn help_timeout(&self) -> Duration {
        Duration::from_secs(self.help_timeout_secs)
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }
}
