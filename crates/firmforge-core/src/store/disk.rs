//! Local-disk job store

use super::traits::*;
use crate::error::{StoreError, StoreResult};
use crate::workspace::Workspace;
use async_trait::async_trait;
use firmforge_types::JobId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Job store keeping one directory per job under a shared root.
#[derive(Debug, Clone)]
pub struct DiskJobStore {
    root: PathBuf,
}

impl DiskJobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))
    }

    fn workspace(&self, id: &JobId) -> Workspace {
        Workspace::new(id.clone(), self.root.join(id.as_str()))
    }
}

#[async_trait]
impl JobStore for DiskJobStore {
    async fn create(&self, id: &JobId) -> StoreResult<Workspace> {
        self.ensure_root().await?;

        let workspace = self.workspace(id);
        match tokio::fs::create_dir(workspace.root()).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(id.clone()));
            }
            Err(e) => return Err(StoreError::io(workspace.root(), e)),
        }

        for dir in workspace.skeleton_dirs() {
            if let Err(e) = tokio::fs::create_dir_all(&dir).await {
                let _ = tokio::fs::remove_dir_all(workspace.root()).await;
                return Err(StoreError::io(dir, e));
            }
        }

        Ok(workspace)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Workspace>> {
        let workspace = self.workspace(id);
        match tokio::fs::metadata(workspace.root()).await {
            Ok(meta) if meta.is_dir() => Ok(Some(workspace)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(workspace.root(), e)),
        }
    }

    async fn delete(&self, id: &JobId) -> StoreResult<bool> {
        let root = self.root.join(id.as_str());
        match tokio::fs::remove_dir_all(&root).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(root, e)),
        }
    }

    async fn list(&self) -> StoreResult<Vec<StoredJob>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut jobs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.root, e))?
        {
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_dir() => meta,
                _ => continue,
            };

            let name = entry.file_name();
            let Some(id) = name.to_str().and_then(|n| JobId::parse(n).ok()) else {
                tracing::debug!(entry = ?name, "Skipping non-job entry in store root");
                continue;
            };

            let modified = meta
                .modified()
                .map(chrono::DateTime::<chrono::Utc>::from)
                .unwrap_or_else(|_| chrono::Utc::now());

            jobs.push(StoredJob {
                workspace: self.workspace(&id),
                modified,
            });
        }

        jobs.sort_by(|a, b| a.workspace.job_id().cmp(b.workspace.job_id()));
        Ok(jobs)
    }
}
