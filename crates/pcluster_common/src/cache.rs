//! Cluster cache store
//!
//! One JSON file holding the latest [`RegionCache`] snapshot. The daemon
//! replaces it wholesale on every poll; resolvers read it on every keystroke.
//! There is no lock: writers go through a temp file in the same directory and
//! an atomic rename, so readers see either the previous or the current
//! snapshot and never a torn one.

use crate::error::{CompletionError, Result};
use crate::types::{ClusterRecord, RegionCache};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Cluster names written when bootstrapping an absent cache
pub const PLACEHOLDER_CLUSTERS: [&str; 3] = ["clusterOne", "clusterTwo", "clusterThree"];

/// Status recorded for placeholder clusters
pub const PLACEHOLDER_STATUS: &str = "UNKNOWN";

/// Persisted region -> clusters mapping at a caller-chosen path
#[derive(Debug, Clone)]
pub struct ClusterCacheStore {
    path: PathBuf,
}

impl ClusterCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the whole snapshot.
    pub fn read_snapshot(&self) -> Result<RegionCache> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CompletionError::CacheMissing(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| CompletionError::CacheCorrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Clusters cached for `region`, in listing order. Empty if the region
    /// was never polled; `CacheMissing` if there is no snapshot at all.
    pub fn read(&self, region: &str) -> Result<Vec<ClusterRecord>> {
        let snapshot = self.read_snapshot()?;
        Ok(snapshot.get(region).map(<[_]>::to_vec).unwrap_or_default())
    }

    /// Replace the persisted snapshot.
    pub fn write(&self, snapshot: &RegionCache) -> Result<()> {
        let temp_path = self.stage(snapshot)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        debug!(
            "Wrote cluster cache {} ({} regions, {} clusters)",
            self.path.display(),
            snapshot.len(),
            snapshot.cluster_count()
        );
        Ok(())
    }

    /// Write `snapshot` only if no snapshot exists. Never replaces one that
    /// another process wrote in the meantime. Returns whether it wrote.
    pub fn install_if_absent(&self, snapshot: &RegionCache) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }
        let temp_path = self.stage(snapshot)?;
        // hard_link refuses to overwrite an existing destination
        let linked = fs::hard_link(&temp_path, &self.path);
        let _ = fs::remove_file(&temp_path);
        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Bootstrap an absent cache with the placeholder set for `regions`.
    pub fn populate_if_absent(&self, regions: &[String]) -> Result<bool> {
        let written = self.install_if_absent(&placeholder_snapshot(regions))?;
        if written {
            debug!("Bootstrapped placeholder cluster cache at {}", self.path.display());
        }
        Ok(written)
    }

    /// Modification time of the snapshot file.
    pub fn last_written(&self) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    /// How long ago the snapshot was written.
    pub fn age(&self) -> Option<Duration> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(SystemTime::now().duration_since(modified).unwrap_or_default())
    }

    /// Serialize into a temp file next to the canonical path and sync it.
    fn stage(&self, snapshot: &RegionCache) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = self.temp_path();
        let data = serde_json::to_vec_pretty(snapshot)?;

        let staged = File::create(&temp_path).and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        });
        if let Err(e) = staged {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(temp_path)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cluster-cache".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
    }
}

/// The deterministic placeholder snapshot used for bootstrap.
pub fn placeholder_snapshot(regions: &[String]) -> RegionCache {
    let clusters: Vec<ClusterRecord> = PLACEHOLDER_CLUSTERS
        .iter()
        .map(|name| ClusterRecord::new(*name, PLACEHOLDER_STATUS, ""))
        .collect();

    let mut snapshot = RegionCache::new();
    for region in regions {
        snapshot.insert(region.clone(), clusters.clone());
    }
    snapshot
}
