//! Subprocess execution
//!
//! All external programs go through a [`ProcessRunner`]. Production code uses
//! [`SystemRunner`]; dry runs wrap it in [`DryRunRunner`]; tests substitute
//! their own implementation and never touch a real engine install.

use crate::error::{PackagerError, Result};
use crate::process_guard::{ChildTracker, CommandProcessGroup};
use crate::tool_args::Invocation;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// How the child's stdout/stderr are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Stream to the packager's own console (long-running build output)
    Inherit,
    /// Collect into [`ProcessOutput`] for parsing
    Capture,
}

/// Result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Captured stdout; empty in [`OutputMode::Inherit`].
    pub stdout: String,
    /// Captured stderr; empty in [`OutputMode::Inherit`].
    pub stderr: String,
}

impl ProcessOutput {
    /// Successful exit with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed exit with the given code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for propagation; a signal death counts as 1.
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(1)
    }
}

/// Capability to run external programs.
///
/// A non-zero exit is not an error at this level; callers decide what a
/// failed status means. `Err` is reserved for processes that could not be
/// started or waited on.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ProcessOutput>;
}

/// Runs processes for real, each in its own process group.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ProcessOutput> {
        info!(command = %invocation.display(), cwd = ?invocation.working_dir, "running");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .in_new_process_group();
        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }
        match mode {
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
        }

        let spawn_error = |source| PackagerError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let child = cmd.spawn().map_err(spawn_error)?;
        let pid = child.id();
        with_tracker(|t| t.track(pid));

        let output = child.wait_with_output();
        with_tracker(|t| t.untrack(pid));
        let output = output.map_err(spawn_error)?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(program = %invocation.program, exit_code = ?result.exit_code, "process finished");
        Ok(result)
    }
}

fn with_tracker(f: impl FnOnce(&mut ChildTracker)) {
    // A poisoned tracker only loses interrupt cleanup, never the run itself
    if let Ok(mut tracker) = ChildTracker::global().lock() {
        f(&mut tracker);
    }
}

/// Logs mutating invocations instead of running them.
///
/// Read-only invocations (git queries) still execute so the preview reports
/// the real version label.
pub struct DryRunRunner<R> {
    inner: R,
}

impl<R: ProcessRunner> DryRunRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: ProcessRunner> ProcessRunner for DryRunRunner<R> {
    fn run(&self, invocation: &Invocation, mode: OutputMode) -> Result<ProcessOutput> {
        if invocation.mutates {
            info!(command = %invocation.display(), "[dry run] skipped");
            Ok(ProcessOutput::ok(""))
        } else {
            self.inner.run(invocation, mode)
        }
    }
}
