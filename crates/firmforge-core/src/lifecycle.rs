//! Job lifecycle manager
//!
//! Owns the mapping from job identifier to job state. Each accepted request
//! gets its own workspace and its own build task; the task reports through a
//! oneshot channel, so a job is observably `Compiling` until the toolchain
//! finishes.
//!
//! ```text
//! submit -> Compiling -> Succeeded   (workspace retained until cleanup/sweep)
//!                     -> Failed      (workspace deleted after reporting)
//! any state -> cleanup -> gone
//! ```

use crate::archive;
use crate::error::{InvokeError, JobError, JobResult};
use crate::invoker::{BuildInvoker, InvocationOutput};
use crate::locator;
use crate::output::{tail, STDERR_TAIL, STDOUT_TAIL_FAILURE, STDOUT_TAIL_SUCCESS};
use crate::registry::TargetRegistry;
use crate::request::CompileRequest;
use crate::store::JobStore;
use crate::workspace::{Workspace, WorkspaceBuilder};
use chrono::{DateTime, Utc};
use firmforge_types::{CompileReport, FailureKind, JobId, JobPhase, JobStatus, JobSummary};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock, Semaphore};
use tokio::task::JoinHandle;

/// Default bound on concurrently running toolchain processes.
pub const DEFAULT_MAX_CONCURRENT_BUILDS: usize = 4;

/// Ledger entry for a job this process submitted.
#[derive(Debug)]
struct JobRecord {
    board: String,
    phase: JobPhase,
    updated_at: DateTime<Utc>,
    /// Kept for failed jobs only; their workspace is gone
    report: Option<CompileReport>,
    task: Option<JoinHandle<()>>,
}

/// A job whose build task is running.
#[derive(Debug)]
pub struct SubmittedJob {
    pub job_id: JobId,
    receiver: oneshot::Receiver<CompileReport>,
}

impl SubmittedJob {
    /// Wait for the build task's report.
    pub async fn wait(self) -> JobResult<CompileReport> {
        let SubmittedJob { job_id, receiver } = self;
        receiver.await.map_err(|_| JobError::Abandoned(job_id))
    }
}

/// Artifact bytes ready to send.
#[derive(Debug, Clone)]
pub struct ArtifactDownload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub workspaces_removed: usize,
    pub records_purged: usize,
}

/// Coordinates workspace creation, builds, status, downloads and cleanup.
#[derive(Clone)]
pub struct JobManager {
    registry: TargetRegistry,
    store: Arc<dyn JobStore>,
    builder: WorkspaceBuilder,
    invoker: Arc<BuildInvoker>,
    records: Arc<RwLock<HashMap<JobId, JobRecord>>>,
    permits: Arc<Semaphore>,
}

impl JobManager {
    pub fn new(
        store: Arc<dyn JobStore>,
        invoker: BuildInvoker,
        max_concurrent_builds: usize,
    ) -> Self {
        Self {
            registry: TargetRegistry::new(),
            builder: WorkspaceBuilder::new(store.clone()),
            store,
            invoker: Arc::new(invoker),
            records: Arc::new(RwLock::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(max_concurrent_builds.max(1))),
        }
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn invoker(&self) -> &BuildInvoker {
        &self.invoker
    }

    /// Accept a request and start its build without waiting for it.
    ///
    /// Unknown boards fail before anything is allocated. Workspace validation
    /// failures discard the workspace and record no job.
    pub async fn submit(&self, request: CompileRequest) -> JobResult<SubmittedJob> {
        let target = self.registry.resolve(&request.board)?;

        let workspace = self
            .builder
            .create(target, &request.sources, &request.libraries, &request.flags)
            .await
            .map_err(JobError::from)?;
        let job_id = workspace.job_id().clone();

        self.records.write().await.insert(
            job_id.clone(),
            JobRecord {
                board: request.board.clone(),
                phase: JobPhase::Compiling,
                updated_at: Utc::now(),
                report: None,
                task: None,
            },
        );

        let (tx, rx) = oneshot::channel();
        let manager = self.clone();
        let handle = tokio::spawn(async move { manager.run_build(workspace, tx).await });

        match self.records.write().await.get_mut(&job_id) {
            Some(record) if record.phase == JobPhase::Compiling => record.task = Some(handle),
            Some(_) => {}
            // Cleaned up before the handle was stored.
            None => handle.abort(),
        }

        tracing::info!(job_id = %job_id, board = %request.board, "Compile job submitted");

        Ok(SubmittedJob {
            job_id,
            receiver: rx,
        })
    }

    /// Submit and wait for the report.
    pub async fn compile(&self, request: CompileRequest) -> JobResult<CompileReport> {
        self.submit(request).await?.wait().await
    }

    async fn run_build(self, workspace: Workspace, tx: oneshot::Sender<CompileReport>) {
        let job_id = workspace.job_id().clone();

        let report = {
            // The semaphore is never closed.
            let _permit = self.permits.clone().acquire_owned().await.ok();
            tracing::info!(job_id = %job_id, "Build started");
            let result = self.invoker.invoke(workspace.root()).await;
            build_report(&job_id, &workspace, result).await
        };

        tracing::info!(
            job_id = %job_id,
            success = report.success,
            elapsed_ms = report.elapsed_ms,
            artifact = report.artifact.as_ref().map(|a| a.name.as_str()),
            "Build finished"
        );

        let still_tracked = self.finish(&job_id, &report).await;
        let success = report.success;
        if tx.send(report).is_err() {
            tracing::debug!(job_id = %job_id, "Nobody waiting for build report");
        }

        // Failed jobs never accumulate; jobs deleted mid-build are cleaned up too.
        if !success || !still_tracked {
            match self.store.delete(&job_id).await {
                Ok(_) => tracing::debug!(job_id = %job_id, "Workspace deleted after build"),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to delete workspace")
                }
            }
        }
    }

    /// Move a record to its terminal phase. Returns false if the job was
    /// deleted while building.
    async fn finish(&self, job_id: &JobId, report: &CompileReport) -> bool {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(job_id) else {
            return false;
        };

        record.phase = if report.success {
            JobPhase::Succeeded
        } else {
            JobPhase::Failed
        };
        record.updated_at = Utc::now();
        record.task = None;
        record.report = (!report.success).then(|| report.clone());
        true
    }

    /// Current state of a job.
    pub async fn status(&self, id: &JobId) -> JobResult<JobStatus> {
        let tracked = self.records.read().await.get(id).map(|r| {
            (
                r.phase,
                r.report
                    .as_ref()
                    .map(|rep| (rep.message.clone(), rep.stderr.clone())),
            )
        });

        match tracked {
            Some((JobPhase::Compiling, _)) => return Ok(JobStatus::Compiling),
            Some((JobPhase::Failed, failure)) => {
                let (message, errors) =
                    failure.unwrap_or_else(|| ("Compilation failed".to_string(), None));
                return Ok(JobStatus::Failed { message, errors });
            }
            Some((JobPhase::Succeeded, _)) | None => {}
        }

        let Some(workspace) = self.store.get(id).await? else {
            return Ok(JobStatus::NotFound);
        };

        Ok(match locator::locate(&workspace.build_dir()).await {
            Some(artifact) => JobStatus::Completed { artifact },
            None => JobStatus::PendingOrFailed,
        })
    }

    /// Read the located artifact.
    pub async fn artifact(&self, id: &JobId) -> JobResult<ArtifactDownload> {
        let workspace = self.workspace(id).await?;
        let artifact = locator::locate(&workspace.build_dir())
            .await
            .ok_or_else(|| JobError::NotFound("Firmware file not found".to_string()))?;

        let bytes = tokio::fs::read(&artifact.path)
            .await
            .map_err(|e| JobError::Resource(format!("{}: {}", artifact.path.display(), e)))?;

        Ok(ArtifactDownload {
            name: artifact.name,
            bytes,
        })
    }

    /// Zip the whole build output directory. Returns the archive file name and
    /// its bytes.
    pub async fn archive(&self, id: &JobId) -> JobResult<(String, Vec<u8>)> {
        let workspace = self.workspace(id).await?;
        let build_dir = workspace.build_dir();

        if !tokio::fs::metadata(&build_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(JobError::NotFound("Build directory not found".to_string()));
        }

        let bytes = archive::zip_dir_async(build_dir)
            .await
            .map_err(|e| JobError::Resource(e.to_string()))?;

        Ok((format!("firmware_{}.zip", id), bytes))
    }

    /// Delete a job in any state. Returns false when there was nothing to
    /// delete.
    pub async fn cleanup(&self, id: &JobId) -> JobResult<bool> {
        let mut record = self.records.write().await.remove(id);
        if let Some(task) = record.as_mut().and_then(|r| r.task.take()) {
            tracing::info!(job_id = %id, "Aborting in-flight build");
            task.abort();
            // Dropping the build future kills the toolchain's process group;
            // nothing may write into the workspace once it is deleted.
            let _ = task.await;
        }

        let removed = self.store.delete(id).await?;
        if removed {
            tracing::info!(job_id = %id, "Workspace deleted");
        }
        Ok(removed || record.is_some())
    }

    /// All jobs known to the ledger or present in the store.
    pub async fn list(&self) -> JobResult<Vec<JobSummary>> {
        let stored = self.store.list().await?;
        let records = self.records.read().await;

        let mut summaries: BTreeMap<JobId, JobSummary> = BTreeMap::new();
        for job in stored {
            let id = job.workspace.job_id().clone();
            summaries.insert(
                id.clone(),
                JobSummary {
                    job_id: id,
                    target: None,
                    phase: None,
                    has_workspace: true,
                    updated_at: job.modified,
                },
            );
        }

        for (id, record) in records.iter() {
            let entry = summaries.entry(id.clone()).or_insert_with(|| JobSummary {
                job_id: id.clone(),
                target: None,
                phase: None,
                has_workspace: false,
                updated_at: record.updated_at,
            });
            entry.target = Some(record.board.clone());
            entry.phase = Some(record.phase);
            entry.updated_at = entry.updated_at.max(record.updated_at);
        }

        Ok(summaries.into_values().collect())
    }

    /// Delete workspaces and ledger entries untouched for longer than `ttl`.
    /// Jobs that are still compiling are never swept.
    pub async fn sweep(&self, ttl: Duration) -> JobResult<SweepStats> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36500));
        let cutoff = Utc::now() - ttl;
        let mut stats = SweepStats::default();

        let compiling: Vec<JobId> = self
            .records
            .read()
            .await
            .iter()
            .filter(|(_, r)| r.phase == JobPhase::Compiling)
            .map(|(id, _)| id.clone())
            .collect();

        for job in self.store.list().await? {
            let id = job.workspace.job_id();
            if job.modified > cutoff || compiling.contains(id) {
                continue;
            }
            if self.store.delete(id).await? {
                tracing::info!(job_id = %id, modified = %job.modified, "Expired workspace deleted");
                stats.workspaces_removed += 1;
            }
        }

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.phase == JobPhase::Compiling || r.updated_at > cutoff);
        stats.records_purged = before - records.len();

        Ok(stats)
    }

    async fn workspace(&self, id: &JobId) -> JobResult<Workspace> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| JobError::NotFound("Job not found or expired".to_string()))
    }
}

/// Turn a toolchain result into a report with bounded diagnostics.
async fn build_report(
    job_id: &JobId,
    workspace: &Workspace,
    result: Result<InvocationOutput, InvokeError>,
) -> CompileReport {
    match result {
        Ok(out) if out.success() => {
            let artifact = locator::locate(&workspace.build_dir()).await;
            if artifact.is_none() {
                tracing::warn!(job_id = %job_id, "Build succeeded but no artifact was found");
            }
            CompileReport {
                job_id: job_id.clone(),
                success: true,
                message: "Compilation successful".to_string(),
                stdout: tail(&out.stdout, STDOUT_TAIL_SUCCESS).to_string(),
                stderr: None,
                artifact,
                failure: None,
                elapsed_ms: out.elapsed.as_millis() as u64,
            }
        }
        Ok(out) => failed_report(
            job_id,
            &out.stdout,
            &out.stderr,
            FailureKind::Build {
                exit_code: out.exit_code,
            },
            out.elapsed,
        ),
        Err(InvokeError::Timeout { secs, stdout }) => {
            let diagnostic = InvokeError::Timeout {
                secs,
                stdout: String::new(),
            }
            .to_string();
            failed_report(
                job_id,
                &stdout,
                &diagnostic,
                FailureKind::Timeout { secs },
                Duration::from_secs(secs),
            )
        }
        Err(e @ InvokeError::Launch { .. }) => {
            tracing::error!(job_id = %job_id, error = %e, "Toolchain could not be launched");
            let reason = e.to_string();
            failed_report(
                job_id,
                "",
                &reason,
                FailureKind::Launch {
                    reason: reason.clone(),
                },
                Duration::ZERO,
            )
        }
        Err(e @ InvokeError::Io(_)) => {
            tracing::error!(job_id = %job_id, error = %e, "Lost track of toolchain process");
            failed_report(
                job_id,
                "",
                &e.to_string(),
                FailureKind::Build { exit_code: None },
                Duration::ZERO,
            )
        }
    }
}

fn failed_report(
    job_id: &JobId,
    stdout: &str,
    stderr: &str,
    failure: FailureKind,
    elapsed: Duration,
) -> CompileReport {
    CompileReport {
        job_id: job_id.clone(),
        success: false,
        message: "Compilation failed".to_string(),
        stdout: tail(stdout, STDOUT_TAIL_FAILURE).to_string(),
        stderr: Some(tail(stderr, STDERR_TAIL).to_string()),
        artifact: None,
        failure: Some(failure),
        elapsed_ms: elapsed.as_millis() as u64,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::invoker::ToolchainConfig;
    use crate::store::DiskJobStore;
    use firmforge_types::SourceFile;
    use tempfile::TempDir;

    const BLINK: &str = "#include <Arduino.h>\nvoid setup(){}\nvoid loop(){}";

    fn manager(dir: &TempDir, script: &str, timeout_secs: u64) -> JobManager {
        let store = Arc::new(DiskJobStore::new(dir.path()));
        let invoker = BuildInvoker::new(ToolchainConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout_secs,
        });
        JobManager::new(store, invoker, 2)
    }

    const PRODUCE_HEX: &str =
        "mkdir -p .pio/build/target && printf ':00000001FF' > .pio/build/target/firmware.hex && echo done";

    #[tokio::test]
    async fn test_unknown_board_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);

        let err = jobs
            .compile(CompileRequest::single("doesnotexist", BLINK))
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::UnknownTarget(_)));
        assert!(jobs.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_successful_compile_is_retained() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(report.success);
        assert_eq!(report.stdout, "done\n");
        assert_eq!(report.artifact.as_ref().unwrap().name, "firmware.hex");
        assert_eq!(report.artifact.as_ref().unwrap().size, 11);

        match jobs.status(&report.job_id).await.unwrap() {
            JobStatus::Completed { artifact } => assert_eq!(artifact.name, "firmware.hex"),
            other => panic!("unexpected status {other:?}"),
        }

        let download = jobs.artifact(&report.job_id).await.unwrap();
        assert_eq!(download.bytes, b":00000001FF");

        let (name, zip) = jobs.archive(&report.job_id).await.unwrap();
        assert_eq!(name, format!("firmware_{}.zip", report.job_id));
        assert!(!zip.is_empty());
    }

    #[tokio::test]
    async fn test_failed_compile_cleans_workspace() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, "echo compiling; echo 'main.cpp:1: error' >&2; exit 1", 10);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureKind::Build { exit_code: Some(1) }));
        assert_eq!(report.stderr.as_deref(), Some("main.cpp:1: error\n"));

        // Deletion happens after the report is delivered.
        let mut gone = false;
        for _ in 0..50 {
            if std::fs::read_dir(dir.path()).unwrap().count() == 0 {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(gone, "failed workspace was not deleted");

        match jobs.status(&report.job_id).await.unwrap() {
            JobStatus::Failed { errors, .. } => {
                assert_eq!(errors.as_deref(), Some("main.cpp:1: error\n"))
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert!(matches!(
            jobs.artifact(&report.job_id).await,
            Err(JobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_output_is_truncated_to_tail() {
        let dir = TempDir::new().unwrap();
        let script = "i=0; while [ $i -lt 800 ]; do echo 'stdout-line'; echo 'stderr-line' >&2; i=$((i+1)); done; echo END; echo ERR-END >&2; exit 2";
        let jobs = manager(&dir, script, 30);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(report.stdout.len() <= STDOUT_TAIL_FAILURE);
        assert!(report.stdout.ends_with("END\n"));
        let stderr = report.stderr.unwrap();
        assert!(stderr.len() <= STDERR_TAIL);
        assert!(stderr.ends_with("ERR-END\n"));
    }

    #[tokio::test]
    async fn test_success_output_is_truncated_to_tail() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "i=0; while [ $i -lt 800 ]; do echo 'progress-line'; i=$((i+1)); done; {}",
            PRODUCE_HEX
        );
        let jobs = manager(&dir, &script, 30);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(report.success);
        assert!(report.stdout.len() <= STDOUT_TAIL_SUCCESS);
        assert!(report.stdout.ends_with("done\n"));
    }

    #[tokio::test]
    async fn test_timeout_reports_synthetic_diagnostic() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, "exec sleep 30", 1);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(!report.success);
        assert_eq!(report.failure, Some(FailureKind::Timeout { secs: 1 }));
        assert_eq!(
            report.stderr.as_deref(),
            Some("Compile timeout (exceeded 1 seconds)")
        );
    }

    #[tokio::test]
    async fn test_missing_entry_point_discards_workspace() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);

        let request = CompileRequest::files("uno", vec![SourceFile::new("lib.cpp", "int f();")]);
        let err = jobs.submit(request).await.unwrap_err();
        assert!(matches!(err, JobError::MissingEntryPoint));
        assert!(jobs.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_status_is_compiling_while_in_flight() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, "sleep 1; exit 1", 10);

        let submitted = jobs.submit(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert_eq!(jobs.status(&submitted.job_id).await.unwrap(), JobStatus::Compiling);

        let id = submitted.job_id.clone();
        let report = submitted.wait().await.unwrap();
        assert!(!report.success);
        assert!(matches!(jobs.status(&id).await.unwrap(), JobStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        assert!(jobs.cleanup(&report.job_id).await.unwrap());
        assert!(!jobs.cleanup(&report.job_id).await.unwrap());
        assert_eq!(jobs.status(&report.job_id).await.unwrap(), JobStatus::NotFound);
    }

    #[tokio::test]
    async fn test_cleanup_aborts_in_flight_build() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, "exec sleep 30", 60);

        let submitted = jobs.submit(CompileRequest::single("uno", BLINK)).await.unwrap();
        let id = submitted.job_id.clone();
        assert!(jobs.cleanup(&id).await.unwrap());

        assert!(matches!(submitted.wait().await, Err(JobError::Abandoned(_))));
        assert_eq!(jobs.status(&id).await.unwrap(), JobStatus::NotFound);
    }

    /// A zombie counts as gone; orphans may wait on a lazy init to be reaped.
    fn process_running(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit(')')
                .next()
                .map(|rest| !matches!(rest.trim_start().chars().next(), Some('Z' | 'X')))
                .unwrap_or(false),
            Err(_) if std::path::Path::new("/proc/self/stat").exists() => false,
            Err(_) => nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok(),
        }
    }

    #[tokio::test]
    async fn test_cleanup_stops_forked_toolchain_writes() {
        let dir = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let pid_file = scratch.path().join("writer.pid");

        // The background writer lands an artifact one second after it forks.
        let script = "(sleep 1; mkdir -p \"$0/.pio/build/target\"; printf x > \"$0/.pio/build/target/firmware.hex\") & echo $! > \"$1\"; wait";
        let store = Arc::new(DiskJobStore::new(dir.path()));
        let invoker = BuildInvoker::new(ToolchainConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                script.to_string(),
                "{workspace}".to_string(),
                pid_file.to_string_lossy().into_owned(),
            ],
            timeout_secs: 60,
        });
        let jobs = JobManager::new(store, invoker, 2);

        let submitted = jobs.submit(CompileRequest::single("uno", BLINK)).await.unwrap();
        let id = submitted.job_id.clone();

        let mut writer = None;
        for _ in 0..250 {
            writer = std::fs::read_to_string(&pid_file)
                .ok()
                .and_then(|raw| raw.trim().parse::<i32>().ok());
            if writer.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let writer = writer.expect("toolchain never forked its writer");

        assert!(jobs.cleanup(&id).await.unwrap());
        assert_eq!(jobs.status(&id).await.unwrap(), JobStatus::NotFound);
        let mut stopped = false;
        for _ in 0..100 {
            if !process_running(writer) {
                stopped = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(stopped, "writer survived cleanup");

        // Past the point where the writer would have recreated the workspace.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(jobs.status(&id).await.unwrap(), JobStatus::NotFound);
        assert!(!dir.path().join(id.as_str()).exists());
        assert!(jobs.list().await.unwrap().is_empty());
        assert!(matches!(submitted.wait().await, Err(JobError::Abandoned(_))));
    }

    #[tokio::test]
    async fn test_workspace_without_ledger_entry_is_pending_or_failed() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);
        let id = JobId::parse("orphan01").unwrap();
        std::fs::create_dir_all(dir.path().join("orphan01/src")).unwrap();

        assert_eq!(jobs.status(&id).await.unwrap(), JobStatus::PendingOrFailed);
        let listed = jobs.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].phase.is_none());
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_jobs() {
        let dir = TempDir::new().unwrap();
        let jobs = manager(&dir, PRODUCE_HEX, 10);

        let report = jobs.compile(CompileRequest::single("uno", BLINK)).await.unwrap();
        let kept = jobs.sweep(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(kept, SweepStats::default());

        let swept = jobs.sweep(Duration::ZERO).await.unwrap();
        assert_eq!(swept.workspaces_removed, 1);
        assert_eq!(swept.records_purged, 1);
        assert_eq!(jobs.status(&report.job_id).await.unwrap(), JobStatus::NotFound);
    }
}
