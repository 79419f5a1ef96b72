use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{FileSystemId, StoragePath};

pub const REPORT_FORMAT_CSV: &str = "REPORT_CSV_20191124";
pub const REPORT_SCOPE_FAILED_FILES_ONLY: &str = "FAILED_FILES_ONLY";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Import,
    Export,
}

impl TaskAction {
    pub fn kind(self) -> TaskKind {
        match self {
            Self::Import => TaskKind::ImportMetadataFromRepository,
            Self::Export => TaskKind::ExportToRepository,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Export => "export",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    ImportMetadataFromRepository,
    ExportToRepository,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImportMetadataFromRepository => "IMPORT_METADATA_FROM_REPOSITORY",
            Self::ExportToRepository => "EXPORT_TO_REPOSITORY",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "IMPORT_METADATA_FROM_REPOSITORY" => Some(Self::ImportMetadataFromRepository),
            "EXPORT_TO_REPOSITORY" => Some(Self::ExportToRepository),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationLifecycle {
    Creating,
    Available,
    Misconfigured,
    Updating,
    Deleting,
    Failed,
    #[serde(untagged)]
    Unknown(String),
}

impl AssociationLifecycle {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "CREATING" => Self::Creating,
            "AVAILABLE" => Self::Available,
            "MISCONFIGURED" => Self::Misconfigured,
            "UPDATING" => Self::Updating,
            "DELETING" => Self::Deleting,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::Available => "AVAILABLE",
            Self::Misconfigured => "MISCONFIGURED",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Failed => "FAILED",
            Self::Unknown(other) => other,
        }
    }
}

/// A data repository association as reported by the filesystem service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Association {
    pub association_id: Option<String>,
    pub lifecycle: AssociationLifecycle,
    pub data_repository_path: Option<String>,
    pub file_system_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedAssociation {
    pub storage_path: StoragePath,
    pub filesystem_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionReport {
    pub enabled: bool,
    pub path: StoragePath,
    pub format: String,
    pub scope: String,
}

impl CompletionReport {
    /// The only report shape the service accepts for repository tasks.
    pub fn failed_files_only(path: StoragePath) -> Self {
        Self {
            enabled: true,
            path,
            format: REPORT_FORMAT_CSV.to_string(),
            scope: REPORT_SCOPE_FAILED_FILES_ONLY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskRequest {
    pub kind: TaskKind,
    pub file_system_id: FileSystemId,
    pub paths: Vec<String>,
    pub report: CompletionReport,
}

impl TaskRequest {
    /// Renders the request as the equivalent `aws fsx` command line.
    pub fn cli_equivalent(&self) -> String {
        format!(
            "aws fsx create-data-repository-task --file-system-id {} --type {} --paths {} \
             --report Enabled={},Path={},Format={},Scope={}",
            self.file_system_id,
            self.kind.as_str(),
            self.paths.join(","),
            self.report.enabled,
            self.report.path,
            self.report.format,
            self.report.scope,
        )
    }
}

/// Progress counters the service keeps for a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStatus {
    pub total_count: Option<i64>,
    pub succeeded_count: Option<i64>,
    pub failed_count: Option<i64>,
    pub released_count: Option<i64>,
    pub last_updated_time: Option<DateTime<Utc>>,
}

/// The task description returned by the service, timestamps as UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    pub task_id: String,
    pub lifecycle: Option<String>,
    pub kind: Option<TaskKind>,
    pub file_system_id: Option<String>,
    pub paths: Vec<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub resource_arn: Option<String>,
    pub report: Option<CompletionReport>,
    pub status: Option<TaskStatus>,
    pub failure_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: Option<String>,
    pub arn: Option<String>,
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn export_request() -> TaskRequest {
        TaskRequest {
            kind: TaskKind::ExportToRepository,
            file_system_id: FileSystemId::parse("fs-0123456789").expect("fs id"),
            paths: vec!["/data".to_string(), "/scratch".to_string()],
            report: CompletionReport::failed_files_only(
                StoragePath::parse("s3://bucket/prefix/reports").expect("path"),
            ),
        }
    }

    #[test]
    fn cli_equivalent_lists_every_parameter() {
        assert_eq!(
            export_request().cli_equivalent(),
            "aws fsx create-data-repository-task --file-system-id fs-0123456789 \
             --type EXPORT_TO_REPOSITORY --paths /data,/scratch \
             --report Enabled=true,Path=s3://bucket/prefix/reports,\
             Format=REPORT_CSV_20191124,Scope=FAILED_FILES_ONLY"
        );
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let value = serde_json::to_value(export_request()).expect("serialize");
        assert_eq!(value["kind"], "EXPORT_TO_REPOSITORY");
        assert_eq!(value["file_system_id"], "fs-0123456789");
        assert_eq!(value["report"]["path"], "s3://bucket/prefix/reports");
        assert_eq!(value["report"]["scope"], "FAILED_FILES_ONLY");
    }

    #[test]
    fn response_timestamps_render_as_text() {
        let response = TaskResponse {
            task_id: "task-0123".to_string(),
            lifecycle: Some("EXECUTING".to_string()),
            kind: Some(TaskKind::ImportMetadataFromRepository),
            file_system_id: Some("fs-0123456789".to_string()),
            paths: vec!["s3://bucket/prefix".to_string()],
            creation_time: Some(Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()),
            start_time: None,
            end_time: None,
            resource_arn: None,
            report: Some(export_request().report),
            status: Some(TaskStatus {
                total_count: Some(5),
                failed_count: Some(1),
                last_updated_time: Some(Utc.with_ymd_and_hms(2025, 3, 4, 5, 7, 0).unwrap()),
                ..TaskStatus::default()
            }),
            failure_message: None,
        };

        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["creation_time"], "2025-03-04T05:06:07Z");
        assert_eq!(value["kind"], "IMPORT_METADATA_FROM_REPOSITORY");
        assert_eq!(value["report"]["format"], "REPORT_CSV_20191124");
        assert_eq!(value["status"]["total_count"], 5);
        assert_eq!(value["status"]["last_updated_time"], "2025-03-04T05:07:00Z");
    }

    #[test]
    fn lifecycle_keeps_unknown_states() {
        assert_eq!(
            AssociationLifecycle::from_wire("AVAILABLE"),
            AssociationLifecycle::Available
        );
        let odd = AssociationLifecycle::from_wire("ARCHIVED");
        assert_eq!(odd.as_str(), "ARCHIVED");
        assert_eq!(odd, AssociationLifecycle::Unknown("ARCHIVED".to_string()));
    }
}
