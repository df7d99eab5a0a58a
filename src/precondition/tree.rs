//! AND-composition of preconditions, and the named trees each staging
//! operation asserts before touching the filesystem.

use crate::error::PreconditionFailure;

use super::filesystem::{
    DirectoryExists, DirectoryWritable, DirsAreDifferent, NoNestingOnWindows,
    StagingDirDoesNotExist,
};
use super::host_tools::{composer_is_available, HostSupportsRunningProcesses};
use super::link::{
    FileScan, NoAbsoluteSymlinks, NoHardLinks, NoLinksOnWindows, NoSymlinksPointOutside,
    NoSymlinksPointToADirectory,
};
use super::{CheckContext, Precondition};

/// An ordered AND-aggregation of child preconditions.
///
/// Children are evaluated in declared order, each at most once per call;
/// the first failure propagates unchanged. `leaves()` flattens the subtree
/// in declaration order so a test suite can verify every terminal check is
/// reachable.
pub struct PreconditionTree {
    name: &'static str,
    description: &'static str,
    fulfilled: &'static str,
    children: Vec<Box<dyn Precondition>>,
}

impl PreconditionTree {
    pub fn new(
        name: &'static str,
        description: &'static str,
        fulfilled: &'static str,
        children: Vec<Box<dyn Precondition>>,
    ) -> Self {
        Self {
            name,
            description,
            fulfilled,
            children,
        }
    }

    pub fn children(&self) -> &[Box<dyn Precondition>] {
        &self.children
    }
}

impl Precondition for PreconditionTree {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn fulfilled_message(&self) -> &'static str {
        self.fulfilled
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        for child in &self.children {
            child.assert_fulfilled(ctx)?;
        }
        Ok(())
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        self.children
            .iter()
            .flat_map(|child| child.leaves())
            .collect()
    }
}

/// The active directory exists and is writable.
pub fn active_dir_is_ready() -> PreconditionTree {
    PreconditionTree::new(
        "active-dir-is-ready",
        "The active directory is ready for use.",
        "The active directory is ready.",
        vec![
            Box::new(DirectoryExists::active()),
            Box::new(DirectoryWritable::active()),
        ],
    )
}

/// The staging directory exists and is writable.
pub fn staging_dir_is_ready() -> PreconditionTree {
    PreconditionTree::new(
        "staging-dir-is-ready",
        "The staging directory is ready for use.",
        "The staging directory is ready.",
        vec![
            Box::new(DirectoryExists::staging()),
            Box::new(DirectoryWritable::staging()),
        ],
    )
}

/// Checks shared by every staging operation.
pub fn common_preconditions() -> PreconditionTree {
    PreconditionTree::new(
        "common-preconditions",
        "The baseline requirements of every staging operation.",
        "The common preconditions are fulfilled.",
        vec![
            Box::new(active_dir_is_ready()),
            Box::new(composer_is_available()),
            Box::new(HostSupportsRunningProcesses),
            Box::new(DirsAreDifferent),
            Box::new(NoNestingOnWindows),
        ],
    )
}

/// All link-safety checks, in one subtree.
pub fn no_unsupported_links() -> PreconditionTree {
    PreconditionTree::new(
        "no-unsupported-links",
        "The codebase contains no links the synchronizer cannot handle.",
        "There are no unsupported links in the codebase.",
        vec![
            Box::new(FileScan::new(NoAbsoluteSymlinks)),
            Box::new(FileScan::new(NoHardLinks)),
            Box::new(FileScan::new(NoSymlinksPointOutside)),
            Box::new(FileScan::new(NoSymlinksPointToADirectory)),
            Box::new(FileScan::new(NoLinksOnWindows)),
        ],
    )
}

/// Preconditions for `begin`: mirror active into a brand-new staging copy.
pub fn beginner_preconditions() -> PreconditionTree {
    PreconditionTree::new(
        "beginner-preconditions",
        "The preconditions for beginning the staging process.",
        "The preconditions for beginning the staging process are fulfilled.",
        vec![
            Box::new(common_preconditions()),
            Box::new(no_unsupported_links()),
            Box::new(StagingDirDoesNotExist),
        ],
    )
}

/// Preconditions for `stage`: run a Composer command in the staging copy.
pub fn stager_preconditions() -> PreconditionTree {
    PreconditionTree::new(
        "stager-preconditions",
        "The preconditions for staging Composer commands.",
        "The preconditions for staging Composer commands are fulfilled.",
        vec![
            Box::new(common_preconditions()),
            Box::new(staging_dir_is_ready()),
        ],
    )
}

/// Preconditions for `commit`: replay the staged copy onto the active tree.
pub fn committer_preconditions() -> PreconditionTree {
    PreconditionTree::new(
        "committer-preconditions",
        "The preconditions for making staged changes live.",
        "The preconditions for making staged changes live are fulfilled.",
        vec![
            Box::new(common_preconditions()),
            Box::new(no_unsupported_links()),
            Box::new(staging_dir_is_ready()),
        ],
    )
}

/// Preconditions for `clean`: remove the staging directory.
pub fn cleaner_preconditions() -> PreconditionTree {
    PreconditionTree::new(
        "cleaner-preconditions",
        "The preconditions for removing the staging directory.",
        "The preconditions for removing the staging directory are fulfilled.",
        vec![
            Box::new(common_preconditions()),
            Box::new(staging_dir_is_ready()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::exclusions::PathList;
    use crate::host::NativeHost;
    use crate::sync::Backend;

    /// Probe leaf recording how many times it was evaluated.
    struct Probe {
        fulfilled: bool,
        calls: Rc<Cell<usize>>,
    }

    impl Precondition for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn description(&self) -> &'static str {
            "probe"
        }

        fn fulfilled_message(&self) -> &'static str {
            "probe fulfilled"
        }

        fn assert_fulfilled(&self, _ctx: &CheckContext) -> Result<(), PreconditionFailure> {
            self.calls.set(self.calls.get() + 1);
            if self.fulfilled {
                Ok(())
            } else {
                Err(PreconditionFailure::new("probe", "probe unfulfilled"))
            }
        }

        fn leaves(&self) -> Vec<&dyn Precondition> {
            vec![self]
        }
    }

    fn ctx<'a>(exclusions: &'a PathList, host: &'a NativeHost) -> CheckContext<'a> {
        CheckContext {
            active: std::path::Path::new("/nonexistent-active"),
            staging: std::path::Path::new("/nonexistent-staging"),
            exclusions,
            timeout: None,
            host,
            backend: Backend::Native,
        }
    }

    #[test]
    fn test_children_evaluated_in_order_until_first_failure() {
        let counts = [
            Rc::new(Cell::new(0)),
            Rc::new(Cell::new(0)),
            Rc::new(Cell::new(0)),
        ];
        let tree = PreconditionTree::new(
            "t",
            "t",
            "t fulfilled",
            vec![
                Box::new(Probe {
                    fulfilled: true,
                    calls: Rc::clone(&counts[0]),
                }),
                Box::new(Probe {
                    fulfilled: false,
                    calls: Rc::clone(&counts[1]),
                }),
                Box::new(Probe {
                    fulfilled: true,
                    calls: Rc::clone(&counts[2]),
                }),
            ],
        );
        let exclusions = PathList::new();
        let host = NativeHost;
        let ctx = ctx(&exclusions, &host);

        let err = tree.assert_fulfilled(&ctx).unwrap_err();
        // The child failure propagates unchanged.
        assert_eq!(err.name, "probe");
        assert_eq!(err.message, "probe unfulfilled");
        // Each child before and including the failure ran exactly once;
        // nothing after it ran.
        assert_eq!(counts[0].get(), 1);
        assert_eq!(counts[1].get(), 1);
        assert_eq!(counts[2].get(), 0);
    }

    #[test]
    fn test_is_fulfilled_evaluates_each_child_once() {
        let counts = [Rc::new(Cell::new(0)), Rc::new(Cell::new(0))];
        let tree = PreconditionTree::new(
            "t",
            "t",
            "t fulfilled",
            vec![
                Box::new(Probe {
                    fulfilled: true,
                    calls: Rc::clone(&counts[0]),
                }),
                Box::new(Probe {
                    fulfilled: true,
                    calls: Rc::clone(&counts[1]),
                }),
            ],
        );
        let exclusions = PathList::new();
        let host = NativeHost;
        let ctx = ctx(&exclusions, &host);

        assert!(tree.is_fulfilled(&ctx));
        assert_eq!(counts[0].get(), 1);
        assert_eq!(counts[1].get(), 1);
    }

    #[test]
    fn test_status_message_surfaces_first_failure() {
        let calls = Rc::new(Cell::new(0));
        let tree = PreconditionTree::new(
            "t",
            "t",
            "everything is fine",
            vec![Box::new(Probe {
                fulfilled: false,
                calls: Rc::clone(&calls),
            })],
        );
        let exclusions = PathList::new();
        let host = NativeHost;
        let ctx = ctx(&exclusions, &host);

        assert_eq!(tree.status_message(&ctx), "probe unfulfilled");
    }

    #[test]
    fn test_leaves_flatten_nested_trees_in_declaration_order() {
        let tree = beginner_preconditions();
        let names: Vec<_> = tree.leaves().iter().map(|leaf| leaf.name()).collect();
        assert_eq!(
            names,
            vec![
                "active-dir-exists",
                "active-dir-is-writable",
                "composer-is-available",
                "host-supports-running-processes",
                "active-and-staging-dirs-are-different",
                "no-nesting-on-windows",
                "no-absolute-symlinks",
                "no-hard-links",
                "no-symlinks-point-outside-the-codebase",
                "no-symlinks-point-to-a-directory",
                "no-links-exist-on-windows",
                "staging-dir-does-not-exist",
            ],
        );
    }

    #[test]
    fn test_leaves_are_stable_across_calls() {
        let tree = committer_preconditions();
        let first: Vec<_> = tree.leaves().iter().map(|leaf| leaf.name()).collect();
        let second: Vec<_> = tree.leaves().iter().map(|leaf| leaf.name()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_link_safety_leaf_reachable_exactly_once() {
        for tree in [beginner_preconditions(), committer_preconditions()] {
            let names: Vec<_> = tree.leaves().iter().map(|leaf| leaf.name()).collect();
            for expected in [
                "no-absolute-symlinks",
                "no-hard-links",
                "no-symlinks-point-outside-the-codebase",
                "no-symlinks-point-to-a-directory",
                "no-links-exist-on-windows",
            ] {
                let count = names.iter().filter(|name| **name == expected).count();
                assert_eq!(count, 1, "{expected} in {}", tree.name());
            }
        }
    }
}
