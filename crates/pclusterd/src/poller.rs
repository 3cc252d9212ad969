//! Region poller
//!
//! Keeps the cluster cache fresh by listing every configured region on a
//! fixed cadence and writing the whole result set as one snapshot.
//!
//! Flow per cycle:
//! 1. Record the cycle start
//! 2. List each region; a failing region keeps its previous entry
//! 3. Write the combined snapshot
//! 4. Sleep for whatever is left of the interval (never negative)

use pcluster_common::{
    ClusterCacheStore, ClusterLister, ClusterRecord, CompletionError, RegionCache, Result,
};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Outcome of one poll cycle
#[derive(Debug, Clone, Default)]
pub struct PollSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
    /// Failed regions whose previous entry was carried over
    pub preserved: Vec<String>,
    pub clusters: usize,
    pub written: bool,
    pub elapsed: Duration,
}

/// How long to sleep after a cycle that took `elapsed`.
pub fn next_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

pub struct RegionPoller<L: ClusterLister> {
    lister: L,
    store: ClusterCacheStore,
    regions: Vec<String>,
    interval: Duration,
    /// Last snapshot produced (or found on disk at startup)
    previous: RegionCache,
}

impl<L: ClusterLister> RegionPoller<L> {
    pub fn new(lister: L, store: ClusterCacheStore, regions: Vec<String>, interval: Duration) -> Self {
        let previous = match store.read_snapshot() {
            Ok(snapshot) if snapshot.is_empty() => snapshot,
            Ok(snapshot) => {
                info!(
                    "Seeded poller from existing snapshot: {}",
                    snapshot.regions().collect::<Vec<_>>().join(" ")
                );
                snapshot
            }
            Err(CompletionError::CacheMissing(_)) => RegionCache::new(),
            Err(e) => {
                warn!("Ignoring existing snapshot: {}", e);
                RegionCache::new()
            }
        };

        Self {
            lister,
            store,
            regions,
            interval,
            previous,
        }
    }

    /// The snapshot produced by the most recent cycle.
    pub fn last_snapshot(&self) -> &RegionCache {
        &self.previous
    }

    async fn poll_region(&self, region: &str) -> Result<Vec<ClusterRecord>> {
        let listing = self
            .lister
            .list_clusters(region)
            .await
            .map_err(|e| CompletionError::RegionPoll {
                region: region.to_string(),
                reason: e.to_string(),
            })?;

        if listing.malformed_throughout() {
            return Err(CompletionError::RegionPoll {
                region: region.to_string(),
                reason: format!("all {} rows of output were malformed", listing.malformed_rows),
            });
        }
        Ok(listing.clusters)
    }

    /// Run one cycle: poll every region and write the snapshot.
    pub async fn poll_once(&mut self) -> PollSummary {
        let start = Instant::now();
        let mut summary = PollSummary::default();
        let mut snapshot = RegionCache::new();

        for region in &self.regions {
            match self.poll_region(region).await {
                Ok(clusters) => {
                    summary.clusters += clusters.len();
                    snapshot.insert(region.clone(), clusters);
                    summary.succeeded.push(region.clone());
                }
                Err(e) => {
                    warn!("{}", e);
                    if let Some(stale) = self.previous.get(region) {
                        summary.clusters += stale.len();
                        snapshot.insert(region.clone(), stale.to_vec());
                        summary.preserved.push(region.clone());
                    }
                    summary.failed.push(region.clone());
                }
            }
        }

        match self.store.write(&snapshot) {
            Ok(()) => summary.written = true,
            Err(e) => error!(
                "Failed to write cluster cache {}: {}",
                self.store.path().display(),
                e
            ),
        }
        self.previous = snapshot;
        summary.elapsed = start.elapsed();

        info!(
            "Poll cycle done: ok={}, failed={}, preserved={}, clusters={}, written={}, took {}ms",
            summary.succeeded.len(),
            summary.failed.len(),
            summary.preserved.len(),
            summary.clusters,
            summary.written,
            summary.elapsed.as_millis()
        );
        summary
    }

    /// Poll forever, one cycle per interval.
    pub async fn run(&mut self) {
        info!(
            "Polling {} regions every {}s",
            self.regions.len(),
            self.interval.as_secs()
        );
        loop {
            let summary = self.poll_once().await;
            tokio::time::sleep(next_sleep(self.interval, summary.elapsed)).await;
        }
    }
}
