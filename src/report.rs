//! Per-leaf preflight reporting.

use crate::precondition::tree::PreconditionTree;
use crate::precondition::{CheckContext, Precondition};

/// Result of a single readiness check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

impl CheckResult {
    /// Evaluate one leaf in isolation.
    pub fn evaluate(leaf: &dyn Precondition, ctx: &CheckContext) -> Self {
        match leaf.assert_fulfilled(ctx) {
            Ok(()) => Self {
                name: leaf.name().to_string(),
                status: CheckStatus::Pass,
                details: None,
            },
            Err(failure) => Self {
                name: leaf.name().to_string(),
                status: CheckStatus::Fail,
                details: Some(failure.message),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the operation will be refused.
    Fail,
}

/// Results of evaluating every leaf of a precondition tree.
pub struct PreflightReport {
    pub tree_name: &'static str,
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Evaluate each terminal leaf of `tree` in isolation.
    pub fn evaluate(tree: &PreconditionTree, ctx: &CheckContext) -> Self {
        let checks = tree
            .leaves()
            .into_iter()
            .map(|leaf| CheckResult::evaluate(leaf, ctx))
            .collect();
        Self {
            tree_name: tree.name(),
            checks,
        }
    }

    /// Returns true if all checks passed.
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Count of failed checks.
    pub fn fail_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight: {} ===\n", self.tree_name);

        for check in &self.checks {
            let (icon, status_str) = match check.status {
                CheckStatus::Pass => ("✓", "PASS"),
                CheckStatus::Fail => ("✗", "FAIL"),
            };

            print!("  {} [{}] {}", icon, status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let total = self.checks.len();
        let failed = self.fail_count();
        println!("Summary: {}/{} passed", total - failed, total);
        if failed > 0 {
            println!("         {} FAILED - the operation will be refused", failed);
        }
    }
}
