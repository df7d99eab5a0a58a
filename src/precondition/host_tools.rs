//! Host capability leaves: process spawning and required executables.

use crate::error::PreconditionFailure;
use crate::process::{self, Cmd};

use super::{CheckContext, Precondition};

/// The host can spawn subprocesses at all.
///
/// `std::process` defers every failure to spawn time, so the probe actually
/// launches a trivial shell and attaches the spawn error as cause when the
/// environment forbids it.
pub struct HostSupportsRunningProcesses;

impl Precondition for HostSupportsRunningProcesses {
    fn name(&self) -> &'static str {
        "host-supports-running-processes"
    }

    fn description(&self) -> &'static str {
        "The host supports running independent processes."
    }

    fn fulfilled_message(&self) -> &'static str {
        "The host supports running processes."
    }

    fn assert_fulfilled(&self, ctx: &CheckContext) -> Result<(), PreconditionFailure> {
        let (program, args): (&str, &[&str]) = if ctx.host.is_windows() {
            ("cmd", &["/C", "exit 0"])
        } else {
            ("sh", &["-c", "exit 0"])
        };
        match std::process::Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
        {
            Ok(_) => Ok(()),
            Err(err) => Err(PreconditionFailure::with_source(
                self.name(),
                "The host does not support running processes.",
                err,
            )),
        }
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

/// A named executable can be found, spawned, and answers a version query
/// with recognizable output.
///
/// Three distinct failure modes, all collapsing to unfulfilled: not found on
/// the PATH, found but unspawnable, or spawnable but producing output
/// without the expected marker.
pub struct ExecutableIsAvailable {
    name: &'static str,
    description: &'static str,
    fulfilled: &'static str,
    program: &'static str,
    marker: &'static str,
}

/// Composer is installed and answers `composer --version`.
pub fn composer_is_available() -> ExecutableIsAvailable {
    ExecutableIsAvailable {
        name: "composer-is-available",
        description: "Composer is available and responds to a version query.",
        fulfilled: "Composer is available.",
        program: "composer",
        marker: "Composer",
    }
}

/// rsync is installed and answers `rsync --version`.
pub fn rsync_is_available() -> ExecutableIsAvailable {
    ExecutableIsAvailable {
        name: "rsync-is-available",
        description: "rsync is available and responds to a version query.",
        fulfilled: "rsync is available.",
        program: "rsync",
        marker: "rsync",
    }
}

impl Precondition for ExecutableIsAvailable {
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
        let located = match process::find_executable(self.program) {
            Some(path) => path,
            None => {
                return Err(PreconditionFailure::new(
                    self.name,
                    format!("'{}' was not found on the PATH.", self.program),
                ));
            }
        };

        let mut cmd = Cmd::new(located.to_string_lossy())
            .arg("--version")
            .allow_fail();
        if let Some(limit) = ctx.timeout {
            cmd = cmd.timeout(limit);
        }
        let result = match cmd.run() {
            Ok(result) => result,
            Err(err) => {
                return Err(PreconditionFailure::with_source(
                    self.name,
                    format!("'{}' could not be run: {}", located.display(), err),
                    // anyhow::Error does not implement std::error::Error;
                    // flatten the chain into the source slot.
                    std::io::Error::other(format!("{err:#}")),
                ));
            }
        };

        if result.success() && result.stdout.contains(self.marker) {
            return Ok(());
        }
        Err(PreconditionFailure::new(
            self.name,
            format!(
                "'{}' did not produce the expected version output (exit code {}): {}",
                located.display(),
                result.code(),
                first_line(&result.stdout, &result.stderr),
            ),
        ))
    }

    fn leaves(&self) -> Vec<&dyn Precondition> {
        vec![self]
    }
}

fn first_line<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    stdout
        .lines()
        .chain(stderr.lines())
        .find(|line| !line.trim().is_empty())
        .unwrap_or("<no output>")
}
