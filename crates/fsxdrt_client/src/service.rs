use std::collections::BTreeMap;

use async_trait::async_trait;
use fsxdrt_contract::{
    Association, CallerIdentity, FileSystemId, ObjectSummary, StoragePath, TaskRequest,
    TaskResponse,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    /// Declared error returned by the service. `message` is the service's
    /// own text and is displayed unmodified.
    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
        metadata: BTreeMap<String, String>,
    },
    #[error("unexpected service failure: {0}")]
    Unexpected(String),
}

/// The managed filesystem service.
#[async_trait]
pub trait FsxService: Send + Sync {
    /// Associations bound to `file_system_id`, in service order.
    async fn describe_associations(
        &self,
        file_system_id: &FileSystemId,
    ) -> Result<Vec<Association>, ServiceError>;

    /// Creates a data repository task. Not idempotent.
    async fn create_task(&self, request: &TaskRequest) -> Result<TaskResponse, ServiceError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_objects(&self, location: &StoragePath)
        -> Result<Vec<ObjectSummary>, ServiceError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn caller_identity(&self) -> Result<CallerIdentity, ServiceError>;
}
