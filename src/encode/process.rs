use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{ToolFailure, ToolResult, ToolStage};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub(crate) type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Run `cmd` to completion (bounded by `timeout`) and return its stdout.
///
/// Non-zero exit, spawn failure and timeout all map to a [`ToolFailure`] for `stage` carrying the
/// captured stderr.
pub(crate) fn run_tool(
    stage: ToolStage,
    mut cmd: Command,
    timeout: Option<Duration>,
) -> ToolResult<Vec<u8>> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    tracing::debug!(%stage, command = ?cmd, "running external tool");

    let mut child = cmd.spawn().map_err(|e| {
        ToolFailure::new(
            stage,
            None,
            format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                cmd.get_program().to_string_lossy()
            ),
        )
    })?;

    let stdout_drain = spawn_drain(child.stdout.take());
    let stderr_drain = spawn_drain(child.stderr.take());
    let status = wait_with_deadline(stage, &mut child, timeout)?;
    let stdout = join_drain(stage, stdout_drain)?;
    let stderr = join_drain(stage, stderr_drain)?;

    check_status(stage, status, &stderr, timeout)?;
    Ok(stdout)
}

/// Read `pipe` to the end on a helper thread so the child never blocks on a full pipe.
pub(crate) fn spawn_drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Drain> {
    pipe.map(|mut r| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            r.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
    })
}

pub(crate) fn join_drain(stage: ToolStage, drain: Option<Drain>) -> ToolResult<Vec<u8>> {
    match drain {
        Some(handle) => handle
            .join()
            .map_err(|_| ToolFailure::new(stage, None, "output drain thread panicked"))?
            .map_err(|e| ToolFailure::new(stage, None, format!("reading tool output failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Returns `Ok(None)` when the child was killed for exceeding the deadline.
pub(crate) fn wait_with_deadline(
    stage: ToolStage,
    child: &mut Child,
    timeout: Option<Duration>,
) -> ToolResult<Option<ExitStatus>> {
    let wait_err = |e: std::io::Error| ToolFailure::new(stage, None, format!("failed to wait: {e}"));

    let Some(timeout) = timeout else {
        return child.wait().map(Some).map_err(wait_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(wait_err)? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(%stage, timeout_secs = timeout.as_secs_f64(), "external tool timed out; killing it");
            if let Err(e) = child.kill() {
                tracing::warn!(%stage, error = %e, "failed to kill timed-out tool");
            }
            child.wait().map_err(wait_err)?;
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Map a finished (or killed) process to success or a [`ToolFailure`].
pub(crate) fn check_status(
    stage: ToolStage,
    status: Option<ExitStatus>,
    stderr: &[u8],
    timeout: Option<Duration>,
) -> ToolResult<()> {
    let stderr = String::from_utf8_lossy(stderr);
    match status {
        Some(s) if s.success() => Ok(()),
        Some(s) => Err(ToolFailure::new(stage, s.code(), stderr.trim())),
        None => {
            let secs = timeout.map(|t| t.as_secs_f64()).unwrap_or_default();
            let mut msg = format!("timed out after {secs}s");
            if !stderr.trim().is_empty() {
                msg.push_str(": ");
                msg.push_str(stderr.trim());
            }
            Err(ToolFailure::new(stage, None, msg))
        }
    }
}

/// Kills a child process when a guarded blocking call on it outlives `timeout`.
///
/// Writes into a child's stdin block for as long as the child stops reading; killing the child
/// closes the pipe and turns the stalled write into an error.
pub(crate) struct WriteWatchdog {
    arm: Option<Sender<bool>>,
    fired: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl WriteWatchdog {
    pub(crate) fn spawn(stage: ToolStage, child: Arc<Mutex<Child>>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<bool>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let thread = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => return,
                }
                match rx.recv_timeout(timeout) {
                    Ok(_) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {
                        tracing::warn!(
                            %stage,
                            timeout_secs = timeout.as_secs_f64(),
                            "write to external tool stalled; killing it"
                        );
                        flag.store(true, Ordering::SeqCst);
                        match child.lock() {
                            Ok(mut child) => {
                                if let Err(e) = child.kill() {
                                    tracing::warn!(%stage, error = %e, "failed to kill stalled tool");
                                }
                            }
                            Err(_) => tracing::warn!(%stage, "stalled tool handle poisoned"),
                        }
                    }
                }
            }
        });
        Self {
            arm: Some(tx),
            fired,
            thread: Some(thread),
        }
    }

    /// Run `f` with the deadline armed.
    pub(crate) fn guard<T>(&self, f: impl FnOnce() -> T) -> T {
        self.signal(true);
        let out = f();
        self.signal(false);
        out
    }

    /// `true` once the child has been killed for stalling.
    pub(crate) fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    fn signal(&self, armed: bool) {
        if let Some(tx) = &self.arm
            && tx.send(armed).is_err()
        {
            tracing::debug!("write watchdog already stopped");
        }
    }
}

impl Drop for WriteWatchdog {
    fn drop(&mut self) {
        drop(self.arm.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("write watchdog thread panicked");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/process.rs"]
mod tests;
