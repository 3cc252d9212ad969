//! Completion resolver
//!
//! Candidate order for a recognized subcommand:
//! 1. its flags, in help-text order
//! 2. subcommand-specific dynamic candidates
//! 3. cluster names for the resolved region, in cache order
//!
//! Nothing here is allowed to fail the process: every problem degrades to
//! fewer candidates.

use crate::catalog::{CommandCatalog, HelpTextCatalog};
use crate::region::RegionResolver;
use crate::subcommand::SubcommandKind;
use pcluster_common::{
    placeholder_snapshot, AutocompleterConfig, BootstrapMode, ClusterCacheStore, ClusterLister,
    ClusterRecord, CompletionError, CompletionRequest, Result, WrappedCli,
};
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct CompletionResolver<C, L> {
    catalog: C,
    lister: L,
    store: ClusterCacheStore,
    regions: RegionResolver,
    bootstrap: BootstrapMode,
    /// Regions seeded by a placeholder bootstrap
    known_regions: Vec<String>,
    /// Snapshot age past which the daemon is presumed not running
    stale_after: Duration,
}

impl CompletionResolver<HelpTextCatalog, WrappedCli> {
    /// Resolver backed by the real wrapped CLI. A human is waiting on the
    /// answer, so listings get the short help timeout too.
    pub fn from_config(config: &AutocompleterConfig) -> Self {
        let wrapped = WrappedCli::new(
            config.cli_program.clone(),
            config.help_timeout(),
            config.help_timeout(),
        );
        Self::new(
            HelpTextCatalog::new(wrapped.clone()),
            wrapped,
            ClusterCacheStore::new(config.cache_path.clone()),
            RegionResolver::from_config(config),
        )
        .with_bootstrap(config.bootstrap, config.regions.clone())
        .with_stale_after(config.poll_interval().saturating_mul(2))
    }
}

impl<C: CommandCatalog, L: ClusterLister> CompletionResolver<C, L> {
    pub fn new(catalog: C, lister: L, store: ClusterCacheStore, regions: RegionResolver) -> Self {
        Self {
            catalog,
            lister,
            store,
            regions,
            bootstrap: BootstrapMode::default(),
            known_regions: Vec::new(),
            stale_after: Duration::from_secs(2 * 600),
        }
    }

    pub fn with_bootstrap(mut self, mode: BootstrapMode, known_regions: Vec<String>) -> Self {
        self.bootstrap = mode;
        self.known_regions = known_regions;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Candidates for the raw argument list the shell handed us.
    pub async fn complete(&self, args: &[String]) -> Vec<String> {
        match CompletionRequest::from_args(args) {
            None => self.catalog.subcommands().await,
            Some(request) => self.complete_subcommand(&request).await,
        }
    }

    pub async fn complete_subcommand(&self, request: &CompletionRequest) -> Vec<String> {
        let Some(kind) = SubcommandKind::from_name(&request.subcommand) else {
            error!(
                "{}",
                CompletionError::UnrecognizedSubcommand(request.subcommand.clone())
            );
            return Vec::new();
        };
        debug!("Getting completions for `pcluster {}`", kind.name());

        let mut candidates = self.catalog.flags(kind.name()).await;
        if kind.has_dynamic_completions() {
            candidates.extend(kind.dynamic_candidates(request));
        }
        if kind.requires_cluster_name() {
            candidates.extend(self.cluster_names(request).await);
        }
        candidates
    }

    /// Names of cached clusters in the region this request targets.
    pub async fn cluster_names(&self, request: &CompletionRequest) -> Vec<String> {
        let region = self.regions.resolve(&request.remaining_args).region;
        let clusters = self.read_clusters(&region).await;
        debug!(
            "Found {} cached clusters in {}: {}",
            clusters.len(),
            region,
            clusters.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(" ")
        );
        clusters.into_iter().map(|c| c.name).collect()
    }

    async fn read_clusters(&self, region: &str) -> Vec<ClusterRecord> {
        match self.store.read(region) {
            Ok(clusters) => {
                self.check_staleness();
                return clusters;
            }
            Err(CompletionError::CacheMissing(path)) => {
                debug!("No cluster cache at {}; bootstrapping", path.display());
            }
            Err(e) => {
                error!("{}", e);
                return Vec::new();
            }
        }

        self.bootstrap(region).await;
        self.store.read(region).unwrap_or_else(|e| {
            error!("Cluster cache unreadable after bootstrap: {}", e);
            Vec::new()
        })
    }

    async fn bootstrap(&self, region: &str) {
        let installed = match self.bootstrap {
            BootstrapMode::Placeholder => self.store.populate_if_absent(&self.seed_regions(region)),
            BootstrapMode::Live => {
                // other seeded regions keep placeholders until the daemon runs
                let mut snapshot = placeholder_snapshot(&self.seed_regions(region));
                match self.live_listing(region).await {
                    Ok(clusters) => snapshot.insert(region, clusters),
                    Err(e) => warn!("Live bootstrap for {} failed, using placeholder: {}", region, e),
                }
                self.store.install_if_absent(&snapshot)
            }
        };
        if let Err(e) = installed {
            error!("Could not bootstrap cluster cache: {}", e);
        }
    }

    async fn live_listing(&self, region: &str) -> Result<Vec<ClusterRecord>> {
        let listing = self.lister.list_clusters(region).await?;
        if listing.malformed_throughout() {
            return Err(CompletionError::RegionPoll {
                region: region.to_string(),
                reason: format!("all {} rows of output were malformed", listing.malformed_rows),
            });
        }
        Ok(listing.clusters)
    }

    fn seed_regions(&self, region: &str) -> Vec<String> {
        let mut regions = self.known_regions.clone();
        if !regions.iter().any(|r| r == region) {
            regions.push(region.to_string());
        }
        regions
    }

    fn check_staleness(&self) {
        let Some(age) = self.store.age() else {
            return;
        };
        if age > self.stale_after {
            let written = self
                .store
                .last_written()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "at an unknown time".to_string());
            warn!(
                "Cluster cache last written {} ({}s ago); is pclusterd running?",
                written,
                age.as_secs()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pcluster_common::{
        parse_listing_output, ParsedListing, RegionCache, PLACEHOLDER_CLUSTERS,
    };
    use tempfile::TempDir;

    struct StaticCatalog;

    #[async_trait]
    impl CommandCatalog for StaticCatalog {
        async fn subcommands(&self) -> Vec<String> {
            vec!["create".to_string(), "update".to_string(), "delete".to_string()]
        }

        async fn flags(&self, _subcommand: &str) -> Vec<String> {
            vec!["-h".to_string(), "--help".to_string()]
        }
    }

    struct NoLister;

    #[async_trait]
    impl ClusterLister for NoLister {
        async fn list_clusters(&self, region: &str) -> Result<ParsedListing> {
            Err(CompletionError::Subprocess {
                command: format!("pcluster list --region {}", region),
                reason: "not available in tests".to_string(),
            })
        }
    }

    /// Lister that answers every region with the same raw `pcluster list` output
    struct CannedLister(&'static str);

    #[async_trait]
    impl ClusterLister for CannedLister {
        async fn list_clusters(&self, _region: &str) -> Result<ParsedListing> {
            Ok(parse_listing_output(self.0))
        }
    }

    const TRACEBACK: &str = "Traceback (most recent call last):\n\
        botocore.exceptions.NoCredentialsError: Unable to locate credentials\n";

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn resolver(dir: &TempDir) -> CompletionResolver<StaticCatalog, NoLister> {
        resolver_with(dir, NoLister)
    }

    fn resolver_with<L: ClusterLister>(
        dir: &TempDir,
        lister: L,
    ) -> CompletionResolver<StaticCatalog, L> {
        let regions = RegionResolver::new("AWS_DEFAULT_REGION", "us-east-1", None).with_env(|_| None);
        CompletionResolver::new(
            StaticCatalog,
            lister,
            ClusterCacheStore::new(dir.path().join("cache.json")),
            regions,
        )
    }

    #[tokio::test]
    async fn test_no_subcommand_lists_subcommands() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolver(&dir).complete(&[]).await, vec!["create", "update", "delete"]);
    }

    #[tokio::test]
    async fn test_unrecognized_subcommand_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(resolver(&dir).complete(&args(&["frobnicate"])).await.is_empty());
        assert!(!dir.path().join("cache.json").exists());
    }

    #[tokio::test]
    async fn test_static_subcommand_gets_flags_only() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolver(&dir).complete(&args(&["create"])).await,
            vec!["-h", "--help"]
        );
    }

    #[tokio::test]
    async fn test_cluster_names_follow_flags() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        let mut snapshot = RegionCache::new();
        snapshot.insert(
            "us-east-1",
            vec![
                ClusterRecord::new("clusterOne", "CREATE_COMPLETE", "2.10.0"),
                ClusterRecord::new("clusterTwo", "CREATE_COMPLETE", "2.10.0"),
            ],
        );
        resolver.store.write(&snapshot).unwrap();

        assert_eq!(
            resolver.complete(&args(&["update"])).await,
            vec!["-h", "--help", "clusterOne", "clusterTwo"]
        );
    }

    #[tokio::test]
    async fn test_missing_cache_bootstraps_placeholder() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir)
            .with_bootstrap(BootstrapMode::Placeholder, vec!["eu-west-1".to_string()]);

        let candidates = resolver.complete(&args(&["delete", "-r", "ap-south-1"])).await;
        assert_eq!(&candidates[2..], PLACEHOLDER_CLUSTERS.as_slice());

        // configured regions are seeded too
        let snapshot = resolver.store.read_snapshot().unwrap();
        assert!(snapshot.contains_region("eu-west-1"));
        assert!(snapshot.contains_region("ap-south-1"));
    }

    #[tokio::test]
    async fn test_failed_live_bootstrap_falls_back_to_placeholder() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir).with_bootstrap(BootstrapMode::Live, Vec::new());
        let request = CompletionRequest::from_args(&args(&["status"])).unwrap();
        assert_eq!(resolver.cluster_names(&request).await, PLACEHOLDER_CLUSTERS.to_vec());
    }

    #[tokio::test]
    async fn test_corrupt_cache_degrades_to_flags() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);
        std::fs::write(dir.path().join("cache.json"), "garbage").unwrap();
        assert_eq!(resolver.complete(&args(&["ssh"])).await, vec!["-h", "--help"]);
    }

    #[tokio::test]
    async fn test_dynamic_candidates_sit_between_flags_and_clusters() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolver(&dir).complete(&args(&["dcv"])).await,
            vec!["-h", "--help", "connect"]
        );
    }

    #[tokio::test]
    async fn test_live_bootstrap_rejects_error_output() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_with(&dir, CannedLister(TRACEBACK))
            .with_bootstrap(BootstrapMode::Live, vec!["eu-west-1".to_string()]);

        let request = CompletionRequest::from_args(&args(&["status"])).unwrap();
        assert_eq!(resolver.cluster_names(&request).await, PLACEHOLDER_CLUSTERS.to_vec());

        let request = CompletionRequest::from_args(&args(&["status", "-r", "eu-west-1"])).unwrap();
        assert_eq!(resolver.cluster_names(&request).await, PLACEHOLDER_CLUSTERS.to_vec());
    }

    #[tokio::test]
    async fn test_live_bootstrap_seeds_other_regions() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_with(&dir, CannedLister("live CREATE_COMPLETE 2.10.0\n"))
            .with_bootstrap(BootstrapMode::Live, vec!["eu-west-1".to_string()]);

        let request = CompletionRequest::from_args(&args(&["ssh"])).unwrap();
        assert_eq!(resolver.cluster_names(&request).await, vec!["live"]);

        let snapshot = resolver.store.read_snapshot().unwrap();
        let eu: Vec<&str> = snapshot
            .get("eu-west-1")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(eu, PLACEHOLDER_CLUSTERS.to_vec());
    }

    #[test]
    fn test_huge_poll_interval_saturates_stale_threshold() {
        let config = AutocompleterConfig {
            poll_interval_secs: u64::MAX,
            ..AutocompleterConfig::default()
        };
        let resolver = CompletionResolver::from_config(&config);
        assert_eq!(resolver.stale_after, Duration::MAX);
    }
}
