//! Centralized command execution with consistent error handling.
//!
//! All external tools run through the [`Cmd`] builder, which captures
//! stderr for error messages, optionally streams output line-by-line to a
//! caller-supplied callback, and bounds wall-clock time when a timeout is
//! set. A timeout surfaces as [`CmdTimeout`] so callers can tell it apart
//! from ordinary failures.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use thiserror::Error;

/// A command exceeded its wall-clock limit and was killed.
#[derive(Debug, Error)]
#[error("'{program}' timed out after {}s", .limit.as_secs())]
pub struct CmdTimeout {
    pub program: String,
    pub limit: Duration,
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    /// If true, don't fail on non-zero exit.
    allow_fail: bool,
    /// Custom error message prefix.
    error_prefix: Option<String>,
    /// Wall-clock limit; the child is killed when exceeded.
    timeout: Option<Duration>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            allow_fail: false,
            error_prefix: None,
            timeout: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Add a path as an argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.envs
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Allow non-zero exit codes without failing.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Set a custom error message prefix.
    pub fn error_msg(mut self, msg: impl AsRef<str>) -> Self {
        self.error_prefix = Some(msg.as_ref().to_string());
        self
    }

    /// Bound the command's wall-clock time.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Run the command and capture output.
    pub fn run(self) -> Result<CommandResult> {
        if self.timeout.is_none() {
            return self.run_buffered();
        }
        self.run_supervised(None)
    }

    /// Run the command, feeding each output line (stdout and stderr,
    /// verbatim, in arrival order) to `on_output` as it is produced.
    pub fn run_streaming(self, on_output: &mut dyn FnMut(&str)) -> Result<CommandResult> {
        self.run_supervised(Some(on_output))
    }

    /// Simple capture path: no timeout, no streaming.
    fn run_buffered(self) -> Result<CommandResult> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        let result = CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        self.finish(result)
    }

    /// Supervised path: pipes are drained by reader threads while the child
    /// is polled against the deadline.
    fn run_supervised(self, mut on_output: Option<&mut dyn FnMut(&str)>) -> Result<CommandResult> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        let mut child: Child = cmd
            .spawn()
            .with_context(|| format!("Failed to execute '{}'. Is it installed?", self.program))?;

        let stdout = child
            .stdout
            .take()
            .context("child stdout pipe unavailable")?;
        let stderr = child
            .stderr
            .take()
            .context("child stderr pipe unavailable")?;

        let (tx, rx) = mpsc::channel::<Line>();
        let out_reader = spawn_line_reader(stdout, tx.clone(), Line::Out);
        let err_reader = spawn_line_reader(stderr, tx, Line::Err);

        let deadline = self.timeout.map(|limit| Instant::now() + limit);
        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();
        let mut timed_out = false;

        loop {
            match rx.recv_timeout(Duration::from_millis(50)) {
                Ok(line) => {
                    let (text, buf) = match &line {
                        Line::Out(text) => (text, &mut stdout_buf),
                        Line::Err(text) => (text, &mut stderr_buf),
                    };
                    if let Some(cb) = on_output.as_mut() {
                        cb(text);
                    }
                    buf.push_str(text);
                    buf.push('\n');
                }
                Err(RecvTimeoutError::Timeout) => {}
                // Both readers finished; pipes are closed.
                Err(RecvTimeoutError::Disconnected) => break,
            }
            if !timed_out {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        timed_out = true;
                        let _ = child.kill();
                    }
                }
            }
        }

        let _ = out_reader.join();
        let _ = err_reader.join();
        let status = child
            .wait()
            .with_context(|| format!("failed to wait for '{}'", self.program))?;

        if timed_out {
            return Err(CmdTimeout {
                program: self.program,
                limit: self.timeout.unwrap_or_default(),
            }
            .into());
        }

        let result = CommandResult {
            status,
            stdout: stdout_buf,
            stderr: stderr_buf,
        };
        self.finish(result)
    }

    /// Shared exit-status handling.
    fn finish(self, result: CommandResult) -> Result<CommandResult> {
        if !self.allow_fail && !result.success() {
            let prefix = self
                .error_prefix
                .unwrap_or_else(|| format!("'{}' failed", self.program));

            let stderr = result.stderr_trimmed();
            if stderr.is_empty() {
                bail!("{} (exit code {})", prefix, result.code());
            } else {
                bail!("{} (exit code {}):\n{}", prefix, result.code(), stderr);
            }
        }
        Ok(result)
    }
}

enum Line {
    Out(String),
    Err(String),
}

fn spawn_line_reader<R>(reader: R, tx: Sender<Line>, wrap: fn(String) -> Line) -> JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            match line {
                Ok(text) => {
                    if tx.send(wrap(text)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}

/// Locate a program on the PATH.
pub fn find_executable(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Check if a program exists in PATH.
pub fn exists(program: &str) -> bool {
    find_executable(program).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let result = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(result.success());
        assert_eq!(result.stdout_trimmed(), "hello");
    }

    #[test]
    fn test_run_captures_stderr() {
        // `ls` on a non-existent file writes to stderr
        let result = Cmd::new("ls")
            .arg("/nonexistent_path_12345")
            .allow_fail()
            .run()
            .unwrap();

        assert!(!result.success());
        assert!(!result.stderr.is_empty());
    }

    #[test]
    fn test_run_failure_includes_stderr() {
        let err = Cmd::new("ls")
            .arg("/nonexistent_path_12345")
            .run()
            .unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("No such file") || msg.contains("cannot access"));
    }

    #[test]
    fn test_custom_error_message() {
        let err = Cmd::new("false") // `false` always exits with 1
            .error_msg("Custom staging step failed")
            .run()
            .unwrap_err();

        assert!(err.to_string().contains("Custom staging step failed"));
    }

    #[test]
    fn test_allow_fail() {
        let result = Cmd::new("false").allow_fail().run().unwrap();

        assert!(!result.success());
        assert_eq!(result.code(), 1);
    }

    #[test]
    fn test_run_in_directory() {
        let result = Cmd::new("pwd").dir(Path::new("/tmp")).run().unwrap();
        assert!(result.stdout_trimmed().contains("tmp"));
    }

    #[test]
    fn test_env_passed_to_child() {
        let result = Cmd::new("sh")
            .args(["-c", "echo $STAGEHAND_TEST_VAR"])
            .env("STAGEHAND_TEST_VAR", "marker")
            .run()
            .unwrap();
        assert_eq!(result.stdout_trimmed(), "marker");
    }

    #[test]
    fn test_streaming_receives_lines_in_order() {
        let mut lines = Vec::new();
        let result = Cmd::new("sh")
            .args(["-c", "echo one; echo two"])
            .run_streaming(&mut |line| lines.push(line.to_string()))
            .unwrap();

        assert!(result.success());
        assert_eq!(lines, vec!["one", "two"]);
        assert!(result.stdout.contains("one"));
        assert!(result.stdout.contains("two"));
    }

    #[test]
    fn test_timeout_kills_child() {
        let err = Cmd::new("sleep")
            .arg("5")
            .timeout(Duration::from_millis(100))
            .run()
            .unwrap_err();

        let timeout = err.downcast_ref::<CmdTimeout>();
        assert!(timeout.is_some(), "expected CmdTimeout, got: {err}");
        assert_eq!(timeout.map(|t| t.program.as_str()), Some("sleep"));
    }

    #[test]
    fn test_command_within_timeout_succeeds() {
        let result = Cmd::new("echo")
            .arg("fast")
            .timeout(Duration::from_secs(5))
            .run()
            .unwrap();
        assert_eq!(result.stdout_trimmed(), "fast");
    }

    #[test]
    fn test_find_executable() {
        assert!(find_executable("sh").is_some());
        assert!(find_executable("nonexistent_program_12345").is_none());
    }

    #[test]
    fn test_exists() {
        assert!(exists("sh"));
        assert!(!exists("nonexistent_program_12345"));
    }
}
