//! Exclusion lists: ordered sets of relative paths to skip while scanning
//! and copying.
//!
//! Entries are normalized on intake (Windows separators mapped to `/`,
//! `./` prefixes and trailing slashes trimmed) and deduplicated on the
//! normalized form, first occurrence winning. Iteration order is stable but
//! carries no meaning; matching is by membership or ancestor-directory
//! prefix, never by position.

use std::path::Path;

/// An ordered, deduplicated list of relative exclusion paths.
#[derive(Debug, Clone, Default)]
pub struct PathList {
    paths: Vec<String>,
}

/// Map `\` to `/` and strip leading `./`, a leading `/`, and trailing `/`.
fn normalize_entry(raw: &str) -> String {
    let mut s = raw.replace('\\', "/");
    while s.starts_with("./") {
        s.drain(..2);
    }
    let s = s.trim_start_matches('/').trim_end_matches('/');
    s.to_string()
}

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.add(entry.as_ref());
        }
        list
    }

    /// Add an entry, normalizing it first. Duplicates and empty entries are
    /// dropped silently.
    pub fn add(&mut self, raw: &str) {
        let normalized = normalize_entry(raw);
        if normalized.is_empty() || self.paths.contains(&normalized) {
            return;
        }
        self.paths.push(normalized);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True iff `rel` (a path relative to the scanned root) equals an entry
    /// or has an entry as an ancestor directory.
    ///
    /// Matching respects segment boundaries: the entry `one` matches
    /// `one` and `one/two` but never `one_two`.
    pub fn matches(&self, rel: &Path) -> bool {
        let rel = match rel.to_str() {
            Some(s) => normalize_entry(s),
            // Non-UTF-8 paths cannot have been listed; treat as unmatched.
            None => return false,
        };
        self.paths.iter().any(|entry| {
            rel == *entry
                || (rel.len() > entry.len()
                    && rel.starts_with(entry.as_str())
                    && rel.as_bytes()[entry.len()] == b'/')
        })
    }
}
