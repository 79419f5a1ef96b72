use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use fsxdrt_contract::{
    Association, CallerIdentity, FileSystemId, ObjectSummary, StoragePath, TaskRequest,
    TaskResponse,
};
use tracing::info;

use crate::service::{FsxService, IdentityProvider, ObjectStore, ServiceError};

/// Scripted stand-in for the filesystem service. Records every submitted
/// request and counts calls so callers can assert on round-trips.
#[derive(Debug, Default)]
pub struct InMemoryFsxService {
    associations: Vec<Association>,
    describe_failure: Option<ServiceError>,
    create_failure: Option<ServiceError>,
    describe_calls: AtomicUsize,
    create_calls: AtomicUsize,
    submitted: Mutex<Vec<TaskRequest>>,
}

impl InMemoryFsxService {
    pub fn new(associations: Vec<Association>) -> Self {
        Self {
            associations,
            ..Self::default()
        }
    }

    pub fn with_describe_failure(mut self, error: ServiceError) -> Self {
        self.describe_failure = Some(error);
        self
    }

    pub fn with_create_failure(mut self, error: ServiceError) -> Self {
        self.create_failure = Some(error);
        self
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<TaskRequest> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl FsxService for InMemoryFsxService {
    async fn describe_associations(
        &self,
        file_system_id: &FileSystemId,
    ) -> Result<Vec<Association>, ServiceError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.describe_failure {
            return Err(error.clone());
        }

        info!(file_system_id = %file_system_id, count = self.associations.len(), "serving scripted associations");
        Ok(self.associations.clone())
    }

    async fn create_task(&self, request: &TaskRequest) -> Result<TaskResponse, ServiceError> {
        let sequence = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = &self.create_failure {
            return Err(error.clone());
        }

        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        Ok(TaskResponse {
            task_id: format!("task-{sequence:017x}"),
            lifecycle: Some("PENDING".to_string()),
            kind: Some(request.kind),
            file_system_id: Some(request.file_system_id.to_string()),
            paths: request.paths.clone(),
            creation_time: Some(Utc::now()),
            start_time: None,
            end_time: None,
            resource_arn: None,
            report: Some(request.report.clone()),
            status: None,
            failure_message: None,
        })
    }
}

/// Objects keyed by bucket; listing filters on key prefix.
#[derive(Debug, Default, Clone)]
pub struct InMemoryObjectStore {
    buckets: BTreeMap<String, Vec<ObjectSummary>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, size: i64) -> Self {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .push(ObjectSummary {
                key: key.to_string(),
                size: Some(size),
                last_modified: Some(Utc::now()),
            });
        self
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_objects(
        &self,
        location: &StoragePath,
    ) -> Result<Vec<ObjectSummary>, ServiceError> {
        let objects = self.buckets.get(location.bucket()).ok_or_else(|| ServiceError::Api {
            code: Some("NoSuchBucket".to_string()),
            message: format!("The specified bucket does not exist: {}", location.bucket()),
            metadata: BTreeMap::new(),
        })?;

        Ok(objects
            .iter()
            .filter(|object| object.key.starts_with(location.prefix()))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    identity: Option<CallerIdentity>,
}

impl InMemoryIdentityProvider {
    pub fn new(identity: CallerIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// A provider that behaves as if no credentials were configured.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn caller_identity(&self) -> Result<CallerIdentity, ServiceError> {
        self.identity
            .clone()
            .ok_or_else(|| ServiceError::Unexpected("no credentials configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use fsxdrt_contract::{CompletionReport, TaskKind};

    use super::*;

    fn request() -> TaskRequest {
        TaskRequest {
            kind: TaskKind::ExportToRepository,
            file_system_id: FileSystemId::parse("fs-0123456789").expect("fs id"),
            paths: vec!["/data".to_string()],
            report: CompletionReport::failed_files_only(
                StoragePath::parse("s3://bucket/reports").expect("path"),
            ),
        }
    }

    #[tokio::test]
    async fn records_each_submission_as_a_new_task() {
        let service = InMemoryFsxService::new(Vec::new());

        let first = service.create_task(&request()).await.expect("first");
        let second = service.create_task(&request()).await.expect("second");

        assert_ne!(first.task_id, second.task_id);
        assert_eq!(service.create_calls(), 2);
        assert_eq!(service.submitted().len(), 2);
        assert_eq!(first.report.as_ref(), Some(&request().report));
    }

    #[tokio::test]
    async fn scripted_failure_is_returned_without_recording() {
        let service = InMemoryFsxService::new(Vec::new())
            .with_create_failure(ServiceError::Transport("connection reset".to_string()));

        let error = service.create_task(&request()).await.expect_err("failure");
        assert_eq!(error, ServiceError::Transport("connection reset".to_string()));
        assert_eq!(service.create_calls(), 1);
        assert!(service.submitted().is_empty());
    }

    #[tokio::test]
    async fn object_store_filters_by_prefix() {
        let store = InMemoryObjectStore::new()
            .with_object("bucket", "prefix/reports/a.csv", 10)
            .with_object("bucket", "prefix/other/b.csv", 20);

        let location = StoragePath::parse("s3://bucket/prefix/reports").expect("path");
        let listed = store.list_objects(&location).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].key, "prefix/reports/a.csv");

        let missing = StoragePath::parse("s3://elsewhere/x").expect("path");
        assert!(matches!(
            store.list_objects(&missing).await,
            Err(ServiceError::Api { .. })
        ));
    }

    #[tokio::test]
    async fn anonymous_identity_fails() {
        assert!(InMemoryIdentityProvider::anonymous()
            .caller_identity()
            .await
            .is_err());
    }
}
