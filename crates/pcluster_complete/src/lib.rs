//! pcluster_complete library - exposes modules for testing
//!
//! Answers "what can come next?" for a partially typed `pcluster` command line
//! using cached cluster listings and live help text.

pub mod catalog;
pub mod help_parser;
pub mod region;
pub mod resolver;
pub mod subcommand;

pub use catalog::{CommandCatalog, HelpTextCatalog};
pub use region::{RegionResolver, RegionSource, ResolvedRegion};
pub use resolver::CompletionResolver;
pub use subcommand::SubcommandKind;
