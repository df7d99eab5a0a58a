//! Error types for the staging core.
//!
//! Preconditions report failure through [`PreconditionFailure`], the expected
//! "not ready yet" signal. Sync transport failures use [`SyncError`], with
//! timeouts kept distinct from generic I/O so callers can tell a slow
//! operation from a broken one. Underlying OS and tool errors are always
//! preserved as the source, never swallowed.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed cause attached to a failure, preserving the diagnostic chain.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An unfulfilled precondition.
///
/// Carries the machine name of the failing leaf and a rendered status
/// message naming the concrete offending path where applicable. Recoverable
/// by the caller; not a bug indicator.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PreconditionFailure {
    /// Machine name of the leaf that failed.
    pub name: &'static str,
    /// Human-readable status message.
    pub message: String,
    /// Underlying error, when one caused the failure.
    #[source]
    pub source: Option<Cause>,
}

impl PreconditionFailure {
    pub fn new(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(name: &'static str, message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self {
            name,
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// A failure while mirroring one directory tree onto another.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("source and destination cannot be the same: {0}")]
    SameSourceAndDestination(PathBuf),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The external tool exited nonzero or could not be spawned.
    #[error("'{command}' failed: {detail}")]
    Tool { command: String, detail: String },

    #[error("sync timed out after {}s", .limit.as_secs())]
    Timeout { limit: Duration },
}

impl SyncError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Top-level error for the staging operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Unfulfilled(#[from] PreconditionFailure),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("invalid composer command: {0}")]
    InvalidCommand(String),

    #[error("composer command failed: {detail}")]
    Command { detail: String },

    #[error("operation timed out after {}s", .limit.as_secs())]
    Timeout { limit: Duration },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
