use fsxdrt_client::{FsxService, ServiceError};
use fsxdrt_contract::{
    to_canonical_json, CompletionReport, ResolvedAssociation, StoragePath, TaskAction,
    TaskRequest, TaskResponse,
};
use tracing::{debug, error, info, warn};

use crate::error::{TaskError, CREATE_TASK};
use crate::input::{note_report_scope, validate_report_suffix, TaskInput, ValidatedInput};
use crate::resolver::resolve_association;

/// Validates `input`, resolves the filesystem's association, builds the task
/// request for `action` and submits it once.
///
/// Validation failures return before any remote call. A failed resolution
/// returns before the task is submitted.
pub async fn build_and_submit(
    service: &dyn FsxService,
    action: TaskAction,
    input: &TaskInput,
) -> Result<TaskResponse, TaskError> {
    let validated = input.validate()?;
    note_report_scope(input.report_scope.as_deref());
    info!(
        action = action.as_str(),
        file_system_id = %validated.file_system_id,
        paths = ?validated.paths,
        completion_report_path = %validated.report_suffix,
        "preparing data repository task"
    );

    let association = resolve_association(service, &validated.file_system_id).await?;
    let request = build_task_request(action, &validated, &association)?;
    submit_task(service, &request).await
}

/// Assembles the request without touching the network.
///
/// Export targets the caller's filesystem paths, falling back to the
/// association's filesystem path. Import takes the first caller path carrying
/// the storage scheme verbatim, falling back to the association's storage
/// path exactly as reported. Both report to the trimmed storage path with
/// the suffix appended.
pub fn build_task_request(
    action: TaskAction,
    input: &ValidatedInput,
    association: &ResolvedAssociation,
) -> Result<TaskRequest, TaskError> {
    let report_path = report_destination(&association.storage_path, &input.report_suffix)?;

    let paths = match action {
        TaskAction::Export => export_paths(&input.paths, association),
        TaskAction::Import => import_paths(&input.paths, association),
    };

    Ok(TaskRequest {
        kind: action.kind(),
        file_system_id: input.file_system_id.clone(),
        paths,
        report: CompletionReport::failed_files_only(report_path),
    })
}

pub(crate) fn report_destination(
    storage_path: &StoragePath,
    report_suffix: &str,
) -> Result<StoragePath, TaskError> {
    let report_suffix = validate_report_suffix(report_suffix)?;
    storage_path
        .join_suffix(&report_suffix)
        .map_err(|err| TaskError::Validation(err.to_string()))
}

fn export_paths(requested: &[String], association: &ResolvedAssociation) -> Vec<String> {
    let paths: Vec<String> = requested
        .iter()
        .filter(|path| !path.trim().is_empty())
        .cloned()
        .collect();

    if paths.is_empty() {
        vec![association.filesystem_path.clone()]
    } else {
        paths
    }
}

fn import_paths(requested: &[String], association: &ResolvedAssociation) -> Vec<String> {
    let mut prefixed = requested.iter().filter(|path| StoragePath::has_scheme(path));
    if let Some(path) = prefixed.next() {
        let extra: Vec<&String> = prefixed.collect();
        if !extra.is_empty() {
            warn!(
                using = %path,
                ignored = ?extra,
                "import takes a single repository path; ignoring the rest"
            );
        }
        return vec![path.clone()];
    }

    let ignored: Vec<&String> = requested
        .iter()
        .filter(|path| !path.trim().is_empty())
        .collect();
    if !ignored.is_empty() {
        warn!(
            ignored = ?ignored,
            storage_path = %association.storage_path,
            "import paths lack the s3:// prefix; importing from the association path instead"
        );
    }
    vec![association.storage_path.as_str().to_string()]
}

/// Submits a built request. Declared service errors are logged with their
/// metadata and surfaced as [`TaskError::RemoteService`] carrying the
/// service's message unchanged.
pub async fn submit_task(
    service: &dyn FsxService,
    request: &TaskRequest,
) -> Result<TaskResponse, TaskError> {
    let rendered =
        to_canonical_json(request).unwrap_or_else(|err| format!("<unrenderable: {err}>"));
    info!(operation = CREATE_TASK, request = %rendered, "API call parameters");
    info!(command = %request.cli_equivalent(), "CLI equivalent");

    match service.create_task(request).await {
        Ok(response) => {
            info!(
                task_id = %response.task_id,
                lifecycle = response.lifecycle.as_deref().unwrap_or("<unknown>"),
                file_system_id = %request.file_system_id,
                "created data repository task"
            );
            debug!(response = ?response, "create response");
            Ok(response)
        }
        Err(err) => {
            match &err {
                ServiceError::Api {
                    code,
                    message,
                    metadata,
                } => {
                    error!(
                        operation = CREATE_TASK,
                        file_system_id = %request.file_system_id,
                        code = code.as_deref().unwrap_or("<none>"),
                        message = %message,
                        request = %rendered,
                        "service rejected data repository task"
                    );
                    error!(metadata = ?metadata, "error response metadata");
                }
                ServiceError::Transport(_) | ServiceError::Unexpected(_) => {
                    error!(
                        operation = CREATE_TASK,
                        file_system_id = %request.file_system_id,
                        request = %rendered,
                        error = %err,
                        "data repository task submission failed"
                    );
                }
            }
            Err(TaskError::from_service(
                CREATE_TASK,
                &request.file_system_id,
                err,
            ))
        }
    }
}
