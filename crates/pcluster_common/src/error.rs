//! Error types for the completion tools.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("No cluster cache snapshot at {0}")]
    CacheMissing(PathBuf),

    #[error("Cluster cache snapshot at {path} is unreadable: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    #[error("Help text did not have the expected shape: {0}")]
    DiscoveryParse(String),

    #[error("No completion behavior for subcommand `{0}`")]
    UnrecognizedSubcommand(String),

    #[error("Polling region {region} failed: {reason}")]
    RegionPoll { region: String, reason: String },

    #[error("Subprocess `{command}` failed: {reason}")]
    Subprocess { command: String, reason: String },

    #[error("Subprocess `{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompletionError {
    /// Errors that mean "the wrapped CLI could not give us an answer".
    pub fn is_subprocess_failure(&self) -> bool {
        matches!(
            self,
            CompletionError::Subprocess { .. } | CompletionError::Timeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CompletionError>;
