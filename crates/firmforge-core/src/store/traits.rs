//! Storage trait definitions

use crate::error::StoreResult;
use crate::workspace::Workspace;
use async_trait::async_trait;
use firmforge_types::JobId;

/// A workspace known to the store.
#[derive(Debug, Clone)]
pub struct StoredJob {
    pub workspace: Workspace,

    /// Last modification of the workspace root
    pub modified: chrono::DateTime<chrono::Utc>,
}

/// Storage for job workspaces
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Allocate an empty workspace for a new job
    async fn create(&self, id: &JobId) -> StoreResult<Workspace>;

    /// Get the workspace of a job, if it still exists
    async fn get(&self, id: &JobId) -> StoreResult<Option<Workspace>>;

    /// Recursively delete a job's workspace; returns whether anything existed
    async fn delete(&self, id: &JobId) -> StoreResult<bool>;

    /// List all workspaces
    async fn list(&self) -> StoreResult<Vec<StoredJob>>;
}
