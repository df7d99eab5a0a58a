//! Configuration management for stagehand.
//!
//! Reads configuration from a `.env` file and environment variables;
//! environment variables take precedence (dotenvy never overrides a
//! variable that is already set).

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::exclusions::PathList;
use crate::sync::Backend;

/// Default staging location, relative to the base directory.
pub const DEFAULT_STAGING_DIR: &str = ".stagehand/staging";

/// Default wall-clock bound for sync and Composer operations.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    /// The live codebase (default: the base directory itself).
    pub active_dir: PathBuf,
    /// The isolated working copy (default: `.stagehand/staging`).
    pub staging_dir: PathBuf,
    /// Synchronization backend (default: rsync).
    pub backend: Backend,
    /// Wall-clock bound per operation; 0 disables it.
    pub timeout: Option<Duration>,
    /// Comma-separated relative paths to leave out of every mirror.
    pub exclusions: PathList,
}

impl Config {
    /// Load configuration from the environment, resolving relative paths
    /// against `base_dir`.
    pub fn load(base_dir: &Path) -> Self {
        let active_dir = path_var("STAGEHAND_ACTIVE_DIR", base_dir)
            .unwrap_or_else(|| base_dir.to_path_buf());
        let staging_dir = path_var("STAGEHAND_STAGING_DIR", base_dir)
            .unwrap_or_else(|| base_dir.join(DEFAULT_STAGING_DIR));

        let backend = env::var("STAGEHAND_SYNC_BACKEND")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Backend::Rsync);

        let timeout_secs = env::var("STAGEHAND_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let exclusions = match env::var("STAGEHAND_EXCLUDE") {
            Ok(raw) => PathList::from(raw.split(',').map(str::trim)),
            Err(_) => PathList::new(),
        };

        Self {
            active_dir,
            staging_dir,
            backend,
            timeout,
            exclusions,
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  STAGEHAND_ACTIVE_DIR: {}", self.active_dir.display());
        println!("  STAGEHAND_STAGING_DIR: {}", self.staging_dir.display());
        println!("  STAGEHAND_SYNC_BACKEND: {:?}", self.backend);
        match self.timeout {
            Some(timeout) => println!("  STAGEHAND_TIMEOUT_SECS: {}", timeout.as_secs()),
            None => println!("  STAGEHAND_TIMEOUT_SECS: 0 (disabled)"),
        }
        if self.exclusions.is_empty() {
            println!("  STAGEHAND_EXCLUDE: (none)");
        } else {
            let entries: Vec<_> = self.exclusions.iter().collect();
            println!("  STAGEHAND_EXCLUDE: {}", entries.join(","));
        }
    }
}

fn path_var(key: &str, base_dir: &Path) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        Some(path)
    } else {
        Some(base_dir.join(path))
    }
}
