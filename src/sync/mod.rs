//! Mirroring one directory tree onto another.
//!
//! Two interchangeable backends implement [`FileSyncer`]: an rsync wrapper
//! and a dependency-free native fallback. Both run the same validation and
//! nesting-exclusion preparation, so their observable results match (minus
//! the native backend's documented directory-symlink limitation).

pub mod native;
pub mod rsync;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::error::SyncError;
use crate::exclusions::PathList;
use crate::path;

/// Which synchronization backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Rsync,
    Native,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rsync" => Ok(Backend::Rsync),
            "native" => Ok(Backend::Native),
            other => Err(format!("unknown sync backend '{other}' (expected 'rsync' or 'native')")),
        }
    }
}

/// One `sync()` call's worth of inputs. Transient, never persisted.
pub struct SyncRequest<'a> {
    pub source: &'a Path,
    pub destination: &'a Path,
    pub exclusions: &'a PathList,
    /// Wall-clock bound for the whole transfer.
    pub timeout: Option<Duration>,
}

/// Copies a source tree onto a destination tree.
///
/// `sync` either fully completes or fails; there is no partial-success
/// return. Output lines (file names, deletions) stream to `progress`
/// verbatim as the transfer proceeds.
pub trait FileSyncer {
    fn sync(
        &self,
        request: &SyncRequest,
        progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<(), SyncError>;
}

/// Construct the configured backend.
pub fn syncer_for(backend: Backend) -> Box<dyn FileSyncer> {
    match backend {
        Backend::Rsync => Box::new(rsync::RsyncFileSyncer),
        Backend::Native => Box::new(native::NativeFileSyncer),
    }
}

/// Validated, resolved inputs shared by both backends.
pub(crate) struct PreparedSync {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Caller exclusions plus any nesting-derived self-exclusion.
    pub exclusions: PathList,
}

/// Shared validation and nesting handling, run before any copying:
/// the source must be an existing directory, the resolved endpoints must
/// differ, and the destination is created up front. When one endpoint is
/// nested inside the other, the nested endpoint's relative path joins the
/// effective exclusions so the copy pass never descends into the
/// destination and the delete pass never prunes the source.
pub(crate) fn prepare(request: &SyncRequest) -> Result<PreparedSync, SyncError> {
    let source = path::resolve_cwd(request.source);
    let destination = path::resolve_cwd(request.destination);

    match fs::metadata(&source) {
        Err(_) => return Err(SyncError::SourceMissing(source)),
        Ok(meta) if !meta.is_dir() => return Err(SyncError::SourceNotDirectory(source)),
        Ok(_) => {}
    }
    if source == destination {
        return Err(SyncError::SameSourceAndDestination(source));
    }
    fs::create_dir_all(&destination).map_err(|err| {
        SyncError::io(
            format!("could not create destination directory {}", destination.display()),
            err,
        )
    })?;

    let mut exclusions = request.exclusions.clone();
    if path::is_descendant(&source, &destination) {
        let rel = path::relative_to(&source, &destination);
        exclusions.add(&rel.to_string_lossy());
        debug!(excluded = %rel.display(), "destination is nested in source");
    } else if path::is_descendant(&destination, &source) {
        let rel = path::relative_to(&destination, &source);
        exclusions.add(&rel.to_string_lossy());
        debug!(excluded = %rel.display(), "source is nested in destination");
    }

    Ok(PreparedSync {
        source,
        destination,
        exclusions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("rsync".parse::<Backend>().unwrap(), Backend::Rsync);
        assert_eq!("native".parse::<Backend>().unwrap(), Backend::Native);
        assert!("scp".parse::<Backend>().is_err());
    }

    #[test]
    fn test_prepare_rejects_missing_source() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("missing");
        let destination = temp.path().join("dest");
        let exclusions = PathList::new();
        let request = SyncRequest {
            source: &source,
            destination: &destination,
            exclusions: &exclusions,
            timeout: None,
        };
        assert!(matches!(
            prepare(&request),
            Err(SyncError::SourceMissing(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_file_source() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("file.txt");
        fs::write(&source, "x").unwrap();
        let destination = temp.path().join("dest");
        let exclusions = PathList::new();
        let request = SyncRequest {
            source: &source,
            destination: &destination,
            exclusions: &exclusions,
            timeout: None,
        };
        assert!(matches!(
            prepare(&request),
            Err(SyncError::SourceNotDirectory(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_identical_endpoints() {
        let temp = tempfile::tempdir().unwrap();
        let exclusions = PathList::new();
        let request = SyncRequest {
            source: temp.path(),
            destination: temp.path(),
            exclusions: &exclusions,
            timeout: None,
        };
        assert!(matches!(
            prepare(&request),
            Err(SyncError::SameSourceAndDestination(_))
        ));
    }

    #[test]
    fn test_prepare_creates_destination() {
        let temp = tempfile::tempdir().unwrap();
        let destination = temp.path().join("a/b/c");
        let exclusions = PathList::new();
        let request = SyncRequest {
            source: temp.path(),
            destination: &destination,
            exclusions: &exclusions,
            timeout: None,
        };
        // Destination nested in source also gains a self-exclusion.
        let prepared = prepare(&request).unwrap();
        assert!(destination.is_dir());
        assert!(prepared.exclusions.matches(Path::new("a/b/c")));
    }

    #[test]
    fn test_prepare_excludes_source_nested_in_destination() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("outer/live");
        fs::create_dir_all(&source).unwrap();
        let destination = temp.path().join("outer");
        let exclusions = PathList::new();
        let request = SyncRequest {
            source: &source,
            destination: &destination,
            exclusions: &exclusions,
            timeout: None,
        };
        let prepared = prepare(&request).unwrap();
        assert!(prepared.exclusions.matches(Path::new("live")));
    }

    #[test]
    fn test_prepare_leaves_unrelated_endpoints_alone() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("src");
        fs::create_dir(&source).unwrap();
        let destination = temp.path().join("dst");
        let exclusions = PathList::from(["vendor"]);
        let request = SyncRequest {
            source: &source,
            destination: &destination,
            exclusions: &exclusions,
            timeout: None,
        };
        let prepared = prepare(&request).unwrap();
        assert_eq!(prepared.exclusions.iter().collect::<Vec<_>>(), vec!["vendor"]);
    }
}
