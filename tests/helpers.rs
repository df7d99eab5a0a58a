//! Shared test utilities for stagehand tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use stagehand::host::Host;

/// Test environment with temporary active and staging directories.
///
/// The active directory is created; the staging path is only reserved, so
/// tests that need it absent can rely on that.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// The live codebase directory (created)
    pub active: PathBuf,
    /// The staging directory path (not created)
    pub staging: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let active = base.join("active");
        let staging = base.join("staging");
        fs::create_dir_all(&active).expect("Failed to create active dir");

        Self {
            _temp_dir: temp_dir,
            active,
            staging,
        }
    }

    /// Create the staging directory too.
    pub fn with_staging() -> Self {
        let env = Self::new();
        fs::create_dir_all(&env.staging).expect("Failed to create staging dir");
        env
    }
}

/// A host that claims to be Windows, for exercising Windows-only checks.
#[derive(Debug)]
pub struct WindowsHost;

impl Host for WindowsHost {
    fn is_windows(&self) -> bool {
        true
    }
}

/// Write a file under `root`, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(&path, content).expect("Failed to write file");
}

/// Create a symlink at `root/rel` pointing at `target`.
pub fn make_symlink(root: &Path, rel: &str, target: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    std::os::unix::fs::symlink(target, &path).expect("Failed to create symlink");
}

pub fn assert_file_exists(root: &Path, rel: &str) {
    assert!(
        root.join(rel).is_file(),
        "expected file to exist: {}",
        root.join(rel).display()
    );
}

pub fn assert_file_absent(root: &Path, rel: &str) {
    assert!(
        fs::symlink_metadata(root.join(rel)).is_err(),
        "expected no entry at: {}",
        root.join(rel).display()
    );
}

pub fn assert_file_content(root: &Path, rel: &str, expected: &str) {
    let content = fs::read_to_string(root.join(rel)).expect("Failed to read file");
    assert_eq!(content, expected, "content mismatch for {rel}");
}

pub fn assert_dir_exists(root: &Path, rel: &str) {
    assert!(
        root.join(rel).is_dir(),
        "expected directory to exist: {}",
        root.join(rel).display()
    );
}

pub fn assert_symlink(root: &Path, rel: &str, target: &str) {
    let path = root.join(rel);
    let meta = fs::symlink_metadata(&path).expect("Failed to stat symlink");
    assert!(
        meta.file_type().is_symlink(),
        "expected a symlink at: {}",
        path.display()
    );
    let raw = fs::read_link(&path).expect("Failed to read symlink");
    assert_eq!(raw, PathBuf::from(target), "symlink target mismatch");
}

/// List every entry (files, dirs, links) under `root`, relative, sorted.
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.expect("Failed to walk tree");
        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("entry outside root")
            .to_string_lossy()
            .into_owned();
        entries.push(rel);
    }
    entries
}
