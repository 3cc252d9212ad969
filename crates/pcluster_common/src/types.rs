//! Core data model shared by the daemon and the completion resolver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cluster as reported by `pcluster list` for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub name: String,
    pub status: String,
    pub cli_version: String,
}

impl ClusterRecord {
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        cli_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            cli_version: cli_version.into(),
        }
    }
}

/// Region id -> clusters in that region, in listing order.
///
/// Serialized as a plain JSON object keyed by region. Keys are kept sorted so
/// the snapshot file diffs cleanly between polls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCache {
    regions: BTreeMap<String, Vec<ClusterRecord>>,
}

impl RegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `region` wholesale.
    pub fn insert(&mut self, region: impl Into<String>, clusters: Vec<ClusterRecord>) {
        self.regions.insert(region.into(), clusters);
    }

    pub fn get(&self, region: &str) -> Option<&[ClusterRecord]> {
        self.regions.get(region).map(Vec::as_slice)
    }

    pub fn contains_region(&self, region: &str) -> bool {
        self.regions.contains_key(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of clusters across all regions.
    pub fn cluster_count(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }
}

/// A partially typed `pcluster` invocation, as handed over by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub subcommand: String,
    pub remaining_args: Vec<String>,
}

impl CompletionRequest {
    /// Split the raw argument list. `None` when no subcommand has been typed.
    pub fn from_args(args: &[String]) -> Option<Self> {
        let (subcommand, rest) = args.split_first()?;
        Some(Self {
            subcommand: subcommand.clone(),
            remaining_args: rest.to_vec(),
        })
    }

    /// The last fully typed token after the subcommand, if any.
    pub fn previous_arg(&self) -> Option<&str> {
        self.remaining_args.last().map(String::as_str)
    }
}
