//! Build invoker
//!
//! Runs the external toolchain as an opaque subprocess against a workspace,
//! with a hard wall-clock limit. The toolchain contract is: working directory
//! argument in, exit code, stdout, stderr and an output tree out.

use crate::error::InvokeError;
use crate::output::TailBuffer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Placeholder in the toolchain arguments replaced by the workspace path.
pub const WORKSPACE_PLACEHOLDER: &str = "{workspace}";

/// Bytes of each stream held in memory while the toolchain runs.
const CAPTURE_LIMIT: usize = 64 * 1024;

/// Grace period between SIGTERM and SIGKILL on timeout.
const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// How long to wait for the output readers once the process is gone.
const READER_GRACE: Duration = Duration::from_secs(2);

/// Limit for auxiliary toolchain queries (version, platform listing).
const AUX_TIMEOUT: Duration = Duration::from_secs(30);

/// External toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Toolchain executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Build arguments; `{workspace}` is replaced by the workspace path
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Wall-clock limit for one build in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_program() -> String {
    "pio".to_string()
}

fn default_args() -> Vec<String> {
    vec!["run".to_string(), "-d".to_string(), WORKSPACE_PLACEHOLDER.to_string()]
}

fn default_timeout() -> u64 {
    300
}

/// Captured result of a toolchain run that exited on its own.
#[derive(Debug, Clone)]
pub struct InvocationOutput {
    /// Exit code; `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl InvocationOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Toolchain availability as reported by `<program> --version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainInfo {
    pub available: bool,
    pub version: String,
}

/// Runs the configured toolchain.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    config: ToolchainConfig,
}

impl BuildInvoker {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Build the workspace at `workspace`. A non-zero exit is a normal
    /// result, not an error.
    pub async fn invoke(&self, workspace: &Path) -> Result<InvocationOutput, InvokeError> {
        let dir = workspace.to_string_lossy();
        let args: Vec<String> = self
            .config
            .args
            .iter()
            .map(|a| a.replace(WORKSPACE_PLACEHOLDER, &dir))
            .collect();

        tracing::debug!(
            program = %self.config.program,
            workspace = %workspace.display(),
            timeout_secs = self.config.timeout_secs,
            "Invoking toolchain"
        );

        self.run(&args, Some(workspace), self.timeout()).await
    }

    /// Query the toolchain version. Never fails; an unusable toolchain is
    /// reported as unavailable.
    pub async fn probe(&self) -> ToolchainInfo {
        match self.run(&["--version".to_string()], None, AUX_TIMEOUT).await {
            Ok(out) => ToolchainInfo {
                available: out.success(),
                version: out.stdout.trim().to_string(),
            },
            Err(e) => {
                tracing::debug!(error = %e, "Toolchain probe failed");
                ToolchainInfo {
                    available: false,
                    version: "Unknown".to_string(),
                }
            }
        }
    }

    /// List platforms installed for the toolchain.
    pub async fn installed_platforms(&self) -> Result<InvocationOutput, InvokeError> {
        let args = ["pkg", "list", "-g", "--only-platforms"].map(String::from);
        self.run(&args, None, AUX_TIMEOUT).await
    }

    async fn run(
        &self,
        args: &[String],
        dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<InvocationOutput, InvokeError> {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        // Own process group so a timeout takes the whole toolchain tree down.
        #[cfg(unix)]
        cmd.process_group(0);

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| InvokeError::Launch {
            program: self.config.program.clone(),
            source,
        })?;

        // Dropped before `child`, so the leader is not yet reaped when it fires.
        let mut group = GroupGuard::new(child.id());

        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = tokio::select! {
            status = child.wait() => Some(status?),
            _ = tokio::time::sleep(timeout) => None,
        };

        match status {
            Some(status) => {
                group.disarm();
                let stdout = collect(stdout_task).await;
                let stderr = collect(stderr_task).await;
                let elapsed = started.elapsed();

                tracing::debug!(
                    program = %self.config.program,
                    exit_code = ?status.code(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Toolchain exited"
                );

                Ok(InvocationOutput {
                    exit_code: status.code(),
                    stdout,
                    stderr,
                    elapsed,
                })
            }
            None => {
                tracing::warn!(
                    program = %self.config.program,
                    timeout_secs = timeout.as_secs(),
                    "Toolchain timed out, terminating"
                );
                terminate_process_group(&mut child, GRACE_PERIOD).await;
                group.disarm();

                let stdout = collect(stdout_task).await;
                // Stderr is replaced by the timeout diagnostic.
                let _ = collect(stderr_task).await;

                Err(InvokeError::Timeout {
                    secs: timeout.as_secs(),
                    stdout,
                })
            }
        }
    }
}

/// Kills the toolchain's whole process group when the invocation is dropped
/// mid-run, e.g. when its build task is aborted. `kill_on_drop` alone only
/// reaches the group leader.
struct GroupGuard {
    pid: Option<u32>,
}

impl GroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self { pid }
    }

    /// The leader has been reaped; its pid may be reused.
    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pid) = self.pid.take() {
            tracing::debug!(pid, "Invocation dropped, killing process group");
            kill_process_group(pid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    if let Err(e) = signal::killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        if e != Errno::ESRCH {
            tracing::warn!(pid, error = ?e, "SIGKILL to process group failed");
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> TailBuffer {
    let mut buf = TailBuffer::new(CAPTURE_LIMIT);
    let Some(mut reader) = reader else {
        return buf;
    };

    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.push(&chunk[..n]),
            Err(e) => {
                tracing::warn!("error reading toolchain output: {}", e);
                break;
            }
        }
    }
    buf
}

async fn collect(mut handle: JoinHandle<TailBuffer>) -> String {
    match tokio::time::timeout(READER_GRACE, &mut handle).await {
        Ok(Ok(buf)) => buf.into_string_lossy(),
        Ok(Err(e)) => {
            tracing::warn!("output reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            // Something outside the process group still holds the pipe.
            handle.abort();
            String::new()
        }
    }
}

/// Terminate the child's process group: SIGTERM, grace period, SIGKILL, reap.
#[cfg(unix)]
async fn terminate_process_group(child: &mut Child, grace: Duration) {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return; // Already reaped
    };
    let pgid = Pid::from_raw(-(pid as i32));

    if let Err(e) = signal::kill(pgid, Signal::SIGTERM) {
        if e != Errno::ESRCH {
            tracing::warn!(pid, error = ?e, "SIGTERM to process group failed");
        }
    }

    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        tracing::debug!(pid, "Toolchain ignored SIGTERM");
    }

    // Also catches group members that outlived the leader.
    if let Err(e) = signal::kill(pgid, Signal::SIGKILL) {
        if e != Errno::ESRCH {
            tracing::warn!(pid, error = ?e, "SIGKILL to process group failed");
        }
    }

    let _ = child.wait().await;
}

#[cfg(not(unix))]
async fn terminate_process_group(child: &mut Child, _grace: Duration) {
    let _ = child.kill().await;
    let _ = child.wait().await;
}
