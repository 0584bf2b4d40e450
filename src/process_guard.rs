//! Child process lifecycle management
//!
//! The engine build tool can run for many minutes and spawns its own compiler
//! processes. If the packager is interrupted, those must not keep running
//! against a half-written package directory.
//!
//! - On unix, children are spawned as leaders of their own process group and
//!   receive `SIGTERM` if the packager dies (`PR_SET_PDEATHSIG` on Linux).
//! - Every live child PID is tracked in a global [`ChildTracker`].
//! - A Ctrl+C handler terminates tracked groups (`SIGTERM`, then `SIGKILL`
//!   after a grace period) and exits with status 130.
//!
//! On Windows the console delivers Ctrl+C to the whole process tree, so the
//! tracker only has bookkeeping to do there.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

static CHILD_TRACKER: OnceLock<Arc<Mutex<ChildTracker>>> = OnceLock::new();

/// Exit status used after an interrupt (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Registry of child processes spawned by the packager
#[derive(Debug, Default)]
pub struct ChildTracker {
    pids: HashSet<u32>,
    terminating: bool,
}

impl ChildTracker {
    /// Get or create the global tracker
    pub fn global() -> Arc<Mutex<ChildTracker>> {
        CHILD_TRACKER
            .get_or_init(|| Arc::new(Mutex::new(ChildTracker::default())))
            .clone()
    }

    pub fn track(&mut self, pid: u32) {
        self.pids.insert(pid);
        tracing::debug!(pid, "tracking child process");
    }

    pub fn untrack(&mut self, pid: u32) {
        self.pids.remove(&pid);
        tracing::debug!(pid, "child process finished");
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Terminate every tracked child. Runs at most once per tracker.
    pub fn terminate_all(&mut self, grace_period: Duration) {
        if self.terminating {
            return;
        }
        self.terminating = true;

        if self.pids.is_empty() {
            return;
        }

        tracing::info!(count = self.pids.len(), "terminating child processes");
        let pids: Vec<u32> = self.pids.drain().collect();
        terminate_pids(&pids, grace_period);
    }
}

#[cfg(unix)]
fn terminate_pids(pids: &[u32], grace_period: Duration) {
    use nix::sys::signal::Signal;
    use std::time::Instant;

    for &pid in pids {
        if let Err(e) = signal_group(pid, Signal::SIGTERM) {
            tracing::warn!(pid, error = %e, "SIGTERM to process group failed");
        }
    }

    let start = Instant::now();
    while start.elapsed() < grace_period {
        if pids.iter().all(|&pid| !is_process_alive(pid)) {
            tracing::info!("child processes exited");
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    for &pid in pids {
        if is_process_alive(pid) {
            tracing::warn!(pid, "process group ignored SIGTERM, sending SIGKILL");
            let _ = signal_group(pid, Signal::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn terminate_pids(pids: &[u32], _grace_period: Duration) {
    tracing::debug!(?pids, "relying on console ctrl event to stop children");
}

/// Signal a whole process group (negative PID)
#[cfg(unix)]
fn signal_group(pgid: u32, signal: nix::sys::signal::Signal) -> Result<(), nix::Error> {
    use nix::unistd::Pid;
    nix::sys::signal::kill(Pid::from_raw(-(pgid as i32)), signal)
}

/// True while the process exists and is not a zombie
#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use nix::unistd::Pid;

    if nix::sys::signal::kill(Pid::from_raw(pid as i32), None).is_err() {
        return false;
    }

    // Field 3 of /proc/<pid>/stat is the state; Z and X are not running
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        let state = stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next());
        if let Some(state) = state {
            return !matches!(state, "Z" | "X");
        }
    }

    true
}

/// Install the Ctrl+C handler. Call once at program start.
pub fn init_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        tracing::info!("interrupted, cleaning up");
        if let Ok(mut tracker) = ChildTracker::global().lock() {
            tracker.terminate_all(Duration::from_secs(3));
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// Extension trait for `std::process::Command` to isolate children
pub trait CommandProcessGroup {
    /// Run the command as the leader of a new process group
    fn in_new_process_group(&mut self) -> &mut Self;
}

impl CommandProcessGroup for std::process::Command {
    #[cfg(unix)]
    fn in_new_process_group(&mut self) -> &mut Self {
        use std::os::unix::process::CommandExt;

        self.process_group(0);
        #[cfg(target_os = "linux")]
        unsafe {
            self.pre_exec(|| {
                // Child dies with us rather than building on into an orphaned tree
                if nix::libc::prctl(nix::libc::PR_SET_PDEATHSIG, nix::libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
        self
    }

    #[cfg(not(unix))]
    fn in_new_process_group(&mut self) -> &mut Self {
        self
    }
}
