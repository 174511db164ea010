//! External program invocation
//!
//! ## Invoker Trait
//!
//! Phases never spawn processes themselves; they go through an [`Invoker`]. The default [`ProcessInvoker`] runs the
//! target's launcher as a child process. Tests substitute scripted invokers to drive the oracle and the benchmark
//! without touching the filesystem.
//!
//! ## Process scoping
//!
//! Every child is held by a guard for the whole invocation. All three standard streams are redirected to the null
//! device, the caller blocks until the child exits, and if anything goes wrong before the child has been reaped
//! (wait error, timeout) the guard kills and reaps it on drop.
//!
//! There is no retry. A non-zero exit is returned as [`HarnessError::ExternalProcessFailure`] and the caller is
//! expected to abort.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::error::HarnessError;
use super::target::InvocationRequest;

/// Outcome of one invocation. `Ok(())` means the launcher exited with status zero.
pub type InvocationResult = Result<(), HarnessError>;

/// Run one external invocation to completion.
pub trait Invoker {
    fn invoke(&self, request: &InvocationRequest<'_>) -> InvocationResult;
}

impl<T: Invoker + ?Sized> Invoker for &T {
    fn invoke(&self, request: &InvocationRequest<'_>) -> InvocationResult {
        (**self).invoke(request)
    }
}

/// How long to sleep between `try_wait` polls when a timeout is configured.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Launcher-based invoker (the real thing).
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    /// Upper bound on one invocation. `None` blocks for as long as the child runs.
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ProcessInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill and fail any invocation that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn command(request: &InvocationRequest<'_>) -> Command {
        let mut command = Command::new(&request.target.launcher);
        command
            .args(request.launcher_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Own process group, so a kill reaches workers the launcher forked.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        command
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&self, request: &InvocationRequest<'_>) -> InvocationResult {
        let command = Self::command(request);
        tracing::debug!(
            launcher = %request.target.launcher.display(),
            args = ?request.launcher_args(),
            "invoking external program"
        );

        let mut guard = ChildGuard::spawn(command).map_err(|source| HarnessError::Spawn {
            launcher: request.target.launcher.clone(),
            source,
        })?;

        let status = match self.timeout {
            None => guard.wait(),
            Some(limit) => match guard.wait_timeout(limit, self.poll_interval) {
                Ok(Some(status)) => Ok(status),
                Ok(None) => {
                    return Err(HarnessError::Timeout {
                        target: request.target.root.clone(),
                        process_count: request.process_count,
                        limit,
                    });
                }
                Err(e) => Err(e),
            },
        }
        .map_err(|e| HarnessError::io(&request.target.launcher, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(HarnessError::ExternalProcessFailure {
                target: request.target.root.clone(),
                process_count: request.process_count,
                code: status.code(),
            })
        }
    }
}

/// Owns a running child until it has been reaped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn spawn(mut command: Command) -> std::io::Result<Self> {
        let child = command.spawn()?;
        Ok(Self { child, reaped: false })
    }

    fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }

    /// Poll until the child exits or `limit` elapses. `Ok(None)` means the limit was hit; the child is left for
    /// `Drop` to kill.
    ///
    /// A limit too large to represent as a deadline blocks like [`Self::wait`].
    fn wait_timeout(&mut self, limit: Duration, poll: Duration) -> std::io::Result<Option<ExitStatus>> {
        let Some(deadline) = Instant::now().checked_add(limit) else {
            return self.wait().map(Some);
        };
        loop {
            if let Some(status) = self.child.try_wait()? {
                self.reaped = true;
                return Ok(Some(status));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            thread::sleep(poll.min(deadline - now));
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        tracing::warn!(pid = self.child.id(), "killing unfinished external program");
        if let Err(e) = kill_process_group(&self.child) {
            tracing::debug!(pid = self.child.id(), error = %e, "could not kill process group");
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// SIGKILL the child's whole process group (the child is its leader, see [`ProcessInvoker`]'s command).
#[cfg(unix)]
#[allow(unsafe_code)]
fn kill_process_group(child: &Child) -> std::io::Result<()> {
    let pgid = libc::pid_t::try_from(child.id())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: killpg takes plain integers and touches no memory owned by this process.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) -> std::io::Result<()> {
    Ok(())
}
