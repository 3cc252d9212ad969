//! pcluster_common - shared types and plumbing for the pcluster completion tools
//!
//! Used by both the polling daemon (`pclusterd`) and the per-keystroke
//! completion resolver (`pcluster_complete`).

pub mod cache;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod types;
pub mod wrapped_cli;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use listing::*;
pub use types::*;
pub use wrapped_cli::*;
