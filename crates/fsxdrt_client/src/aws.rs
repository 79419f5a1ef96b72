use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_fsx::config::http::HttpResponse;
use aws_sdk_fsx::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_fsx::types::{
    CompletionReport as FsxCompletionReport, DataRepositoryAssociation, DataRepositoryTask,
    DataRepositoryTaskStatus, DataRepositoryTaskType, Filter, FilterName, ReportFormat,
    ReportScope,
};
use chrono::{DateTime, Utc};
use fsxdrt_contract::{
    Association, AssociationLifecycle, CallerIdentity, CompletionReport, FileSystemId,
    ObjectSummary, StoragePath, TaskKind, TaskRequest, TaskResponse, TaskStatus,
};
use tracing::debug;

use crate::config::ClientConfig;
use crate::service::{FsxService, IdentityProvider, ObjectStore, ServiceError};

const FILE_SYSTEM_ID_FILTER: &str = "file-system-id";
const REQUEST_ID_KEY: &str = "aws_request_id";
const EXTENDED_REQUEST_ID_KEY: &str = "s3_extended_request_id";

/// The three AWS adapters built from one shared SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsServices {
    pub fsx: AwsFsxService,
    pub s3: AwsObjectStore,
    pub sts: AwsIdentityProvider,
}

impl AwsServices {
    pub async fn connect(config: &ClientConfig) -> Self {
        let sdk_config = config.load_sdk_config().await;
        Self::from_sdk_config(&sdk_config)
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> Self {
        Self {
            fsx: AwsFsxService::new(sdk_config),
            s3: AwsObjectStore::new(sdk_config),
            sts: AwsIdentityProvider::new(sdk_config),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AwsFsxService {
    client: aws_sdk_fsx::Client,
}

impl AwsFsxService {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_fsx::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl FsxService for AwsFsxService {
    async fn describe_associations(
        &self,
        file_system_id: &FileSystemId,
    ) -> Result<Vec<Association>, ServiceError> {
        let filter = Filter::builder()
            .name(FilterName::from(FILE_SYSTEM_ID_FILTER))
            .values(file_system_id.as_str())
            .build();

        let mut associations = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_data_repository_associations()
                .filters(filter.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify_sdk_error)?;

            associations.extend(output.associations().iter().map(convert_association));
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(file_system_id = %file_system_id, count = associations.len(), "described associations");
        Ok(associations)
    }

    async fn create_task(&self, request: &TaskRequest) -> Result<TaskResponse, ServiceError> {
        let report = FsxCompletionReport::builder()
            .enabled(request.report.enabled)
            .path(request.report.path.as_str())
            .format(ReportFormat::from(request.report.format.as_str()))
            .scope(ReportScope::from(request.report.scope.as_str()))
            .build();

        let output = self
            .client
            .create_data_repository_task()
            .r#type(DataRepositoryTaskType::from(request.kind.as_str()))
            .file_system_id(request.file_system_id.as_str())
            .set_paths(Some(request.paths.clone()))
            .report(report)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let task = output.data_repository_task().ok_or_else(|| {
            ServiceError::Unexpected("create response carried no task description".to_string())
        })?;
        convert_task(task)
    }
}

#[derive(Debug, Clone)]
pub struct AwsObjectStore {
    client: aws_sdk_s3::Client,
}

impl AwsObjectStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for AwsObjectStore {
    async fn list_objects(
        &self,
        location: &StoragePath,
    ) -> Result<Vec<ObjectSummary>, ServiceError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(location.bucket())
                .prefix(location.prefix())
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(classify_sdk_error)?;

            objects.extend(output.contents().iter().map(|object| ObjectSummary {
                key: object.key().unwrap_or_default().to_string(),
                size: object.size(),
                last_modified: object.last_modified().and_then(sdk_timestamp),
            }));

            match output.next_continuation_token() {
                Some(token) if !token.is_empty() => continuation = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(objects)
    }
}

#[derive(Debug, Clone)]
pub struct AwsIdentityProvider {
    client: aws_sdk_sts::Client,
}

impl AwsIdentityProvider {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl IdentityProvider for AwsIdentityProvider {
    async fn caller_identity(&self) -> Result<CallerIdentity, ServiceError> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(CallerIdentity {
            account: output.account().map(str::to_string),
            arn: output.arn().map(str::to_string),
            user_id: output.user_id().map(str::to_string),
        })
    }
}

fn convert_association(association: &DataRepositoryAssociation) -> Association {
    Association {
        association_id: association.association_id().map(str::to_string),
        lifecycle: association
            .lifecycle()
            .map(|state| AssociationLifecycle::from_wire(state.as_str()))
            .unwrap_or_else(|| AssociationLifecycle::Unknown(String::new())),
        data_repository_path: association.data_repository_path().map(str::to_string),
        file_system_path: association.file_system_path().map(str::to_string),
    }
}

fn convert_task(task: &DataRepositoryTask) -> Result<TaskResponse, ServiceError> {
    let task_id = task
        .task_id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ServiceError::Unexpected("task description carried no task id".to_string())
        })?;

    Ok(TaskResponse {
        task_id: task_id.to_string(),
        lifecycle: task.lifecycle().map(|state| state.as_str().to_string()),
        kind: task.r#type().and_then(|kind| TaskKind::from_wire(kind.as_str())),
        file_system_id: task.file_system_id().map(str::to_string),
        paths: task.paths().to_vec(),
        creation_time: task.creation_time().and_then(sdk_timestamp),
        start_time: task.start_time().and_then(sdk_timestamp),
        end_time: task.end_time().and_then(sdk_timestamp),
        resource_arn: task.resource_arn().map(str::to_string),
        report: task.report().map(convert_report).transpose()?.flatten(),
        status: task.status().map(convert_status),
        failure_message: task
            .failure_details()
            .and_then(|details| details.message())
            .map(str::to_string),
    })
}

fn convert_report(report: &FsxCompletionReport) -> Result<Option<CompletionReport>, ServiceError> {
    let Some(path) = report.path().filter(|path| !path.is_empty()) else {
        return Ok(None);
    };
    let path = StoragePath::parse(path).map_err(|err| {
        ServiceError::Unexpected(format!("task report path is unusable: {err}"))
    })?;

    Ok(Some(CompletionReport {
        enabled: report.enabled().unwrap_or(false),
        path,
        format: report
            .format()
            .map(|format| format.as_str().to_string())
            .unwrap_or_default(),
        scope: report
            .scope()
            .map(|scope| scope.as_str().to_string())
            .unwrap_or_default(),
    }))
}

fn convert_status(status: &DataRepositoryTaskStatus) -> TaskStatus {
    TaskStatus {
        total_count: status.total_count(),
        succeeded_count: status.succeeded_count(),
        failed_count: status.failed_count(),
        released_count: status.released_capacity(),
        last_updated_time: status.last_updated_time().and_then(sdk_timestamp),
    }
}

fn sdk_timestamp(at: &aws_smithy_types::DateTime) -> Option<DateTime<Utc>> {
    timestamp(at.secs(), at.subsec_nanos())
}

fn timestamp(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
}

/// Sorts an SDK failure into transport, declared-service, or unexpected.
pub(crate) fn classify_sdk_error<E>(error: SdkError<E, HttpResponse>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = error.raw_response().map(|raw| raw.status().as_u16());
    match error {
        SdkError::ServiceError(context) => {
            let err = context.err();
            let meta = err.meta();

            let mut metadata = BTreeMap::new();
            if let Some(status) = status {
                metadata.insert("http_status".to_string(), status.to_string());
            }
            for key in [REQUEST_ID_KEY, EXTENDED_REQUEST_ID_KEY] {
                if let Some(value) = meta.extra(key) {
                    metadata.insert(key.to_string(), value.to_string());
                }
            }

            ServiceError::Api {
                code: err.code().map(str::to_string),
                message: err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(err).to_string()),
                metadata,
            }
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            ServiceError::Transport(DisplayErrorContext(&error).to_string())
        }
        other => ServiceError::Unexpected(DisplayErrorContext(&other).to_string()),
    }
}
