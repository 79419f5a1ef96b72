use fsxdrt_client::FsxService;
use fsxdrt_contract::{
    Association, AssociationLifecycle, FileSystemId, ResolvedAssociation, StoragePath,
};
use tracing::{error, info, warn};

use crate::error::{TaskError, DESCRIBE_ASSOCIATIONS};

/// Finds the association bound to `file_system_id` that is in the
/// `AVAILABLE` state and returns its storage-side and filesystem-side paths.
///
/// Associations are examined in service order and the first available one
/// wins. Several available associations are logged as a warning.
pub async fn resolve_association(
    service: &dyn FsxService,
    file_system_id: &FileSystemId,
) -> Result<ResolvedAssociation, TaskError> {
    let associations = service
        .describe_associations(file_system_id)
        .await
        .map_err(|err| {
            error!(
                operation = DESCRIBE_ASSOCIATIONS,
                file_system_id = %file_system_id,
                error = %err,
                "failed to describe data repository associations"
            );
            TaskError::from_service(DESCRIBE_ASSOCIATIONS, file_system_id, err)
        })?;

    if associations.is_empty() {
        error!(
            operation = DESCRIBE_ASSOCIATIONS,
            file_system_id = %file_system_id,
            "no data repository association found"
        );
        return Err(TaskError::NotFound {
            file_system_id: file_system_id.to_string(),
        });
    }

    let available: Vec<&Association> = associations
        .iter()
        .filter(|association| association.lifecycle == AssociationLifecycle::Available)
        .collect();

    let Some(chosen) = available.first() else {
        let lifecycles: Vec<String> = associations
            .iter()
            .map(|association| association.lifecycle.as_str().to_string())
            .collect();
        error!(
            operation = DESCRIBE_ASSOCIATIONS,
            file_system_id = %file_system_id,
            lifecycles = ?lifecycles,
            "no AVAILABLE data repository association"
        );
        return Err(TaskError::NotAvailable {
            file_system_id: file_system_id.to_string(),
            lifecycles,
        });
    };

    if available.len() > 1 {
        let ids: Vec<&str> = available
            .iter()
            .map(|association| association.association_id.as_deref().unwrap_or("<unknown>"))
            .collect();
        warn!(
            file_system_id = %file_system_id,
            associations = ?ids,
            "multiple AVAILABLE data repository associations; using the first one returned"
        );
    }

    let resolved = into_resolved(file_system_id, chosen).inspect_err(|err| {
        error!(
            operation = DESCRIBE_ASSOCIATIONS,
            file_system_id = %file_system_id,
            error = %err,
            "data repository association is unusable"
        );
    })?;
    info!(
        file_system_id = %file_system_id,
        storage_path = %resolved.storage_path,
        filesystem_path = %resolved.filesystem_path,
        "resolved data repository association"
    );
    Ok(resolved)
}

fn into_resolved(
    file_system_id: &FileSystemId,
    association: &Association,
) -> Result<ResolvedAssociation, TaskError> {
    let unusable = |detail: String| TaskError::Unexpected {
        operation: DESCRIBE_ASSOCIATIONS,
        file_system_id: file_system_id.to_string(),
        message: format!(
            "association {} {detail}",
            association.association_id.as_deref().unwrap_or("<unknown>")
        ),
    };

    let raw_storage = association
        .data_repository_path
        .as_deref()
        .ok_or_else(|| unusable("has no data repository path".to_string()))?;
    let storage_path =
        StoragePath::parse(raw_storage).map_err(|err| unusable(format!("is unusable: {err}")))?;
    let filesystem_path = association
        .file_system_path
        .clone()
        .ok_or_else(|| unusable("has no file system path".to_string()))?;

    Ok(ResolvedAssociation {
        storage_path,
        filesystem_path,
    })
}
