use fsxdrt_client::{FsxService, ObjectStore};
use fsxdrt_contract::{ObjectSummary, StoragePath};
use serde::Serialize;
use tracing::{error, info};

use crate::builder::report_destination;
use crate::error::{TaskError, LIST_OBJECTS};
use crate::input::{parse_file_system_id, require_fields, validate_report_suffix};
use crate::resolver::resolve_association;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportListing {
    pub location: StoragePath,
    pub objects: Vec<ObjectSummary>,
}

/// Lists completion reports written under the destination a task for
/// `file_system_id` with `report_suffix` would report to.
pub async fn list_reports(
    fsx: &dyn FsxService,
    store: &dyn ObjectStore,
    file_system_id: &str,
    report_suffix: &str,
) -> Result<ReportListing, TaskError> {
    require_fields(&[
        ("file_system_id", !file_system_id.trim().is_empty()),
        ("completion_report_path", !report_suffix.trim().is_empty()),
    ])?;
    let file_system_id = parse_file_system_id(file_system_id)?;
    let report_suffix = validate_report_suffix(report_suffix)?;

    let association = resolve_association(fsx, &file_system_id).await?;
    let location = report_destination(&association.storage_path, &report_suffix)?;

    let objects = store.list_objects(&location).await.map_err(|err| {
        error!(
            operation = LIST_OBJECTS,
            file_system_id = %file_system_id,
            location = %location,
            error = %err,
            "failed to list completion reports"
        );
        TaskError::from_service(LIST_OBJECTS, &file_system_id, err)
    })?;

    info!(location = %location, count = objects.len(), "listed completion reports");
    Ok(ReportListing { location, objects })
}
