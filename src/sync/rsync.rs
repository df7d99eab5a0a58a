//! rsync-backed synchronization.
//!
//! Builds an archive-mode mirror command: checksum-based delta comparison,
//! delete-after semantics so the destination is never observed with fewer
//! files than before until stale entries are pruned at the very end, one
//! anchored `--exclude=/<path>` per effective exclusion, and a
//! trailing-slash source so the *contents* of the source are copied rather
//! than the source directory itself.

use tracing::debug;

use crate::error::SyncError;
use crate::process::{Cmd, CmdTimeout};

use super::{prepare, FileSyncer, PreparedSync, SyncRequest};

pub struct RsyncFileSyncer;

impl RsyncFileSyncer {
    /// The full argument vector handed to rsync.
    pub(crate) fn build_args(prepared: &PreparedSync) -> Vec<String> {
        let mut args = vec![
            "--archive".to_string(),
            "--checksum".to_string(),
            "--delete-after".to_string(),
            "--verbose".to_string(),
        ];
        for exclusion in prepared.exclusions.iter() {
            args.push(format!("--exclude=/{exclusion}"));
        }
        args.push(format!("{}/", prepared.source.display()));
        args.push(prepared.destination.display().to_string());
        args
    }
}

impl FileSyncer for RsyncFileSyncer {
    fn sync(
        &self,
        request: &SyncRequest,
        progress: Option<&mut dyn FnMut(&str)>,
    ) -> Result<(), SyncError> {
        let prepared = prepare(request)?;
        let args = Self::build_args(&prepared);
        debug!(?args, "running rsync");

        let mut cmd = Cmd::new("rsync").args(&args);
        if let Some(limit) = request.timeout {
            cmd = cmd.timeout(limit);
        }

        let mut sink = |_: &str| {};
        let on_output: &mut dyn FnMut(&str) = match progress {
            Some(callback) => callback,
            None => &mut sink,
        };

        match cmd.run_streaming(on_output) {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(timeout) = err.downcast_ref::<CmdTimeout>() {
                    return Err(SyncError::Timeout {
                        limit: timeout.limit,
                    });
                }
                Err(SyncError::Tool {
                    command: "rsync".to_string(),
                    detail: format!("{err:#}"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::exclusions::PathList;

    fn prepared(exclusions: PathList) -> PreparedSync {
        PreparedSync {
            source: PathBuf::from("/codebase/active"),
            destination: PathBuf::from("/codebase/staging"),
            exclusions,
        }
    }

    #[test]
    fn test_build_args_archive_checksum_delete_after() {
        let args = RsyncFileSyncer::build_args(&prepared(PathList::new()));
        assert_eq!(
            args,
            vec![
                "--archive",
                "--checksum",
                "--delete-after",
                "--verbose",
                "/codebase/active/",
                "/codebase/staging",
            ],
        );
    }

    #[test]
    fn test_build_args_anchors_each_exclusion() {
        let args = RsyncFileSyncer::build_args(&prepared(PathList::from([
            "vendor",
            "web\\cache",
        ])));
        assert!(args.contains(&"--exclude=/vendor".to_string()));
        assert!(args.contains(&"--exclude=/web/cache".to_string()));
    }

    #[test]
    fn test_build_args_source_has_trailing_slash() {
        let args = RsyncFileSyncer::build_args(&prepared(PathList::new()));
        let source = &args[args.len() - 2];
        let destination = &args[args.len() - 1];
        assert!(source.ends_with('/'));
        assert!(!destination.ends_with('/'));
    }
}
