//! Region resolution for a partially typed command line.
//!
//! Precedence:
//! 1. `-r` / `--region` on the command line
//! 2. the wrapped CLI's own config resolution: environment variable, then the
//!    `[aws] aws_region_name` key of its config file (`-c` / `--config`, else
//!    the default path)
//! 3. a hardcoded default
//!
//! The command line is still being typed, so scanning never fails: unknown
//! tokens are ignored and a flag with no value yet is skipped.

use pcluster_common::AutocompleterConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const REGION_FLAGS: (&str, &str) = ("-r", "--region");
const CONFIG_FLAGS: (&str, &str) = ("-c", "--config");

/// Section and key holding the region in the wrapped CLI's config file
const CONFIG_SECTION: &str = "aws";
const CONFIG_REGION_KEY: &str = "aws_region_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSource {
    Flag,
    Environment,
    ConfigFile,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub region: String,
    pub source: RegionSource,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

pub struct RegionResolver {
    env_var: String,
    default_region: String,
    wrapped_config_path: Option<PathBuf>,
    env_lookup: EnvLookup,
}

impl RegionResolver {
    pub fn new(
        env_var: impl Into<String>,
        default_region: impl Into<String>,
        wrapped_config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            env_var: env_var.into(),
            default_region: default_region.into(),
            wrapped_config_path,
            env_lookup: Box::new(|name| std::env::var(name).ok()),
        }
    }

    pub fn from_config(config: &AutocompleterConfig) -> Self {
        Self::new(
            config.region_env_var.clone(),
            config.default_region.clone(),
            config.wrapped_config_path.clone(),
        )
    }

    /// Replace the process environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Resolve the region for `args` (the tokens after the subcommand).
    pub fn resolve(&self, args: &[String]) -> ResolvedRegion {
        let resolved = self.resolve_inner(args);
        debug!("Resolved region {} from {:?}", resolved.region, resolved.source);
        resolved
    }

    fn resolve_inner(&self, args: &[String]) -> ResolvedRegion {
        if let Some(region) = scan_option(args, REGION_FLAGS) {
            return ResolvedRegion {
                region,
                source: RegionSource::Flag,
            };
        }

        if let Some(region) = (self.env_lookup)(&self.env_var).filter(|r| !r.trim().is_empty()) {
            return ResolvedRegion {
                region: region.trim().to_string(),
                source: RegionSource::Environment,
            };
        }

        let config_path = scan_option(args, CONFIG_FLAGS)
            .map(PathBuf::from)
            .or_else(|| self.wrapped_config_path.clone());
        if let Some(region) = config_path.as_deref().and_then(read_config_region) {
            return ResolvedRegion {
                region,
                source: RegionSource::ConfigFile,
            };
        }

        ResolvedRegion {
            region: self.default_region.clone(),
            source: RegionSource::Default,
        }
    }
}

/// Value of the last occurrence of a short/long option pair.
///
/// Accepts `-r X`, `--region X` and `--region=X`. Attached short values
/// (`-rX`) are not recognized since they are ambiguous with multi-letter
/// short flags such as `-nr`.
pub fn scan_option(args: &[String], (short, long): (&str, &str)) -> Option<String> {
    let mut found = None;
    let long_eq = format!("{}=", long);

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == short || arg == long {
            match args.get(i + 1) {
                Some(value) if !value.starts_with('-') && !value.is_empty() => {
                    found = Some(value.clone());
                    i += 1;
                }
                _ => {}
            }
        } else if let Some(value) = arg.strip_prefix(&long_eq) {
            if !value.is_empty() {
                found = Some(value.to_string());
            }
        }
        i += 1;
    }
    found
}

/// The region setting in an INI-style config file, if present.
pub fn read_config_region(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    parse_config_region(&content)
}

fn parse_config_region(content: &str) -> Option<String> {
    let mut in_section = false;
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = section.trim() == CONFIG_SECTION;
            continue;
        }
        if !in_section {
            continue;
        }
        let Some((key, value)) = line.split_once(&['=', ':'][..]) else {
            continue;
        };
        if key.trim() == CONFIG_REGION_KEY && !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }
    None
}
