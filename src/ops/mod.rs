//! Staging operations: the services callers drive.
//!
//! Each operation owns its named precondition tree and asserts it before
//! touching the filesystem; failures surface as the library error types,
//! untranslated.
//!
//! - `begin` - mirror the active directory into a brand-new staging copy
//! - `stage` - run a Composer command against the staging copy
//! - `commit` - replay the staged copy back onto the active directory
//! - `clean` - remove the staging directory

mod beginner;
mod cleaner;
mod committer;
mod stager;

pub use beginner::Beginner;
pub use cleaner::Cleaner;
pub use committer::Committer;
pub use stager::Stager;
