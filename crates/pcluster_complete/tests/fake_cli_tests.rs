//! End-to-end completion against a fake `pcluster` shell script.

#![cfg(unix)]

use pcluster_common::{
    AutocompleterConfig, ClusterCacheStore, ClusterLister, ClusterRecord, RegionCache, WrappedCli,
};
use pcluster_complete::CompletionResolver;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const FAKE_PCLUSTER: &str = r#"#!/bin/sh
if [ "$1" = "--help" ]; then
cat <<'EOF'
usage: pcluster [-h]
                {create,update,delete,start,stop,status,list,instances,ssh,createami,configure,version,dcv}
                ...

positional arguments:
  {create,update,delete,start,stop,status,list,instances,ssh,createami,configure,version,dcv}
    create              Creates a new cluster.

optional arguments:
  -h, --help            show this help message and exit
EOF
exit 0
fi
if [ "$1" = "list" ]; then
  echo "listed-$3 CREATE_COMPLETE 2.10.0"
  echo "short-row"
  exit 0
fi
if [ "$2" = "--help" ]; then
cat <<'EOF'
usage: pcluster update [-h] [-c CONFIG_FILE] [-r REGION] cluster_name

positional arguments:
  cluster_name          Names the cluster.

optional arguments:
  -h, --help            show this help message and exit
  -c CONFIG_FILE, --config CONFIG_FILE
                        Defines an alternative config file.
  -r REGION, --region REGION
                        Defines the region to connect to.
EOF
exit 0
fi
echo "unknown invocation" >&2
exit 2
"#;

const HANGING_PCLUSTER: &str = "#!/bin/sh\nsleep 30\n";

/// Scripts are written once, before any test spawns a process, so no child
/// can inherit a still-open write handle on them.
fn scripts() -> &'static (TempDir, PathBuf, PathBuf) {
    static SCRIPTS: OnceLock<(TempDir, PathBuf, PathBuf)> = OnceLock::new();
    SCRIPTS.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let fake = write_script(dir.path(), "pcluster", FAKE_PCLUSTER);
        let hanging = write_script(dir.path(), "pcluster-hang", HANGING_PCLUSTER);
        (dir, fake, hanging)
    })
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(cli_program: &Path, cache_dir: &TempDir) -> AutocompleterConfig {
    AutocompleterConfig {
        cli_program: cli_program.to_string_lossy().into_owned(),
        cache_path: cache_dir.path().join("cache.json"),
        help_timeout_secs: 2,
        region_env_var: "PCLUSTER_AUTOCOMPLETER_TEST_UNSET_REGION".to_string(),
        wrapped_config_path: None,
        ..AutocompleterConfig::default()
    }
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_top_level_subcommands_from_help() {
    let cache_dir = TempDir::new().unwrap();
    let resolver = CompletionResolver::from_config(&config(&scripts().1, &cache_dir));

    let candidates = resolver.complete(&[]).await;
    assert_eq!(candidates.len(), 13);
    assert_eq!(candidates[..3], ["create", "update", "delete"]);
}

#[tokio::test]
async fn test_update_offers_flags_then_cached_clusters() {
    let cache_dir = TempDir::new().unwrap();
    let config = config(&scripts().1, &cache_dir);

    let mut snapshot = RegionCache::new();
    snapshot.insert(
        "eu-west-1",
        vec![
            ClusterRecord::new("clusterOne", "CREATE_COMPLETE", "2.10.0"),
            ClusterRecord::new("clusterTwo", "CREATE_COMPLETE", "2.10.0"),
        ],
    );
    snapshot.insert("us-east-1", vec![ClusterRecord::new("east", "CREATE_COMPLETE", "2.10.0")]);
    ClusterCacheStore::new(config.cache_path.clone()).write(&snapshot).unwrap();

    let resolver = CompletionResolver::from_config(&config);
    assert_eq!(
        resolver.complete(&args(&["update", "--region", "eu-west-1"])).await,
        vec!["-h", "--help", "-c", "--config", "-r", "--region", "clusterOne", "clusterTwo"]
    );
    assert_eq!(
        resolver.complete(&args(&["update"])).await,
        vec!["-h", "--help", "-c", "--config", "-r", "--region", "east"]
    );
}

#[tokio::test]
async fn test_unrecognized_subcommand() {
    let cache_dir = TempDir::new().unwrap();
    let resolver = CompletionResolver::from_config(&config(&scripts().1, &cache_dir));
    assert!(resolver.complete(&args(&["frobnicate", "--x"])).await.is_empty());
}

#[tokio::test]
async fn test_missing_cli_degrades_to_cached_names() {
    let cache_dir = TempDir::new().unwrap();
    let config = config(Path::new("/nonexistent/pcluster"), &cache_dir);
    let resolver = CompletionResolver::from_config(&config);

    assert!(resolver.complete(&[]).await.is_empty());
    // no help text, but the placeholder bootstrap still answers
    assert_eq!(
        resolver.complete(&args(&["stop"])).await,
        vec!["clusterOne", "clusterTwo", "clusterThree"]
    );
}

#[tokio::test]
async fn test_hanging_cli_times_out() {
    let cache_dir = TempDir::new().unwrap();
    let mut config = config(&scripts().2, &cache_dir);
    config.help_timeout_secs = 1;
    let resolver = CompletionResolver::from_config(&config);

    let start = Instant::now();
    assert!(resolver.complete(&[]).await.is_empty());
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_listing_through_wrapped_cli() {
    let cli = WrappedCli::new(
        scripts().1.to_string_lossy(),
        Duration::from_secs(2),
        Duration::from_secs(2),
    );
    let listing = cli.list_clusters("ap-south-1").await.unwrap();
    assert_eq!(
        listing.clusters,
        vec![
            ClusterRecord::new("listed-ap-south-1", "CREATE_COMPLETE", "2.10.0"),
            ClusterRecord::new("short-row", "", ""),
        ]
    );
    assert_eq!(listing.malformed_rows, 1);
}
