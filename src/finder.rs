//! Recursive file enumeration with exclusion pruning.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::exclusions::PathList;

/// Enumerate all regular files and symlinks under `root`, skipping entries
/// matched by `exclusions` (exact or ancestor-directory match, relative to
/// `root`). Symlinks are never followed. Directories themselves are not
/// returned. Order is deterministic (lexicographic by file name).
pub fn find_files(root: &Path, exclusions: &PathList) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if exclusions.matches(rel) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if !entry.file_type().is_dir() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}
