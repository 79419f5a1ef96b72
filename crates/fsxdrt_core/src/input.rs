use fsxdrt_contract::{FileSystemId, REPORT_SCOPE_FAILED_FILES_ONLY};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TaskError;

/// Request object accepted by [`crate::build_and_submit`].
///
/// Mirrors the event payload an embedding harness hands over, so every field
/// is optional at the type level and checked by [`TaskInput::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub file_system_id: Option<String>,
    #[serde(default)]
    pub paths: Option<Vec<String>>,
    #[serde(default)]
    pub completion_report_path: Option<String>,
    /// Accepted for compatibility; the submitted scope is always failed files only.
    #[serde(default)]
    pub report_scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    pub file_system_id: FileSystemId,
    pub paths: Vec<String>,
    pub report_suffix: String,
}

impl TaskInput {
    pub fn new(
        file_system_id: impl Into<String>,
        paths: Vec<String>,
        completion_report_path: impl Into<String>,
    ) -> Self {
        Self {
            file_system_id: Some(file_system_id.into()),
            paths: Some(paths),
            completion_report_path: Some(completion_report_path.into()),
            report_scope: None,
        }
    }

    pub fn with_report_scope(mut self, scope: impl Into<String>) -> Self {
        self.report_scope = Some(scope.into());
        self
    }

    /// Checks presence of every required field first, then shapes. Runs no I/O.
    pub fn validate(&self) -> Result<ValidatedInput, TaskError> {
        let paths_present = self
            .paths
            .as_ref()
            .is_some_and(|paths| !paths.is_empty());

        require_fields(&[
            ("file_system_id", is_present(self.file_system_id.as_deref())),
            ("paths", paths_present),
            (
                "completion_report_path",
                is_present(self.completion_report_path.as_deref()),
            ),
        ])?;

        let file_system_id =
            parse_file_system_id(self.file_system_id.as_deref().unwrap_or_default())?;
        let report_suffix =
            validate_report_suffix(self.completion_report_path.as_deref().unwrap_or_default())?;

        Ok(ValidatedInput {
            file_system_id,
            paths: self.paths.clone().unwrap_or_default(),
            report_suffix,
        })
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

pub(crate) fn require_fields(fields: &[(&'static str, bool)]) -> Result<(), TaskError> {
    let names: Vec<&'static str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if names.is_empty() {
        Ok(())
    } else {
        Err(TaskError::MissingParameter { names })
    }
}

pub(crate) fn parse_file_system_id(raw: &str) -> Result<FileSystemId, TaskError> {
    FileSystemId::parse(raw).map_err(|err| TaskError::Validation(err.to_string()))
}

pub(crate) fn validate_report_suffix(raw: &str) -> Result<String, TaskError> {
    let suffix = raw.trim();
    if !suffix.starts_with('/') {
        return Err(TaskError::Validation(format!(
            "completion report path {raw:?} must begin with '/'"
        )));
    }
    Ok(suffix.to_string())
}

pub(crate) fn note_report_scope(requested: Option<&str>) {
    match requested {
        Some(scope) if scope != REPORT_SCOPE_FAILED_FILES_ONLY => warn!(
            requested = %scope,
            applied = REPORT_SCOPE_FAILED_FILES_ONLY,
            "report scope is not supported by the service and is ignored"
        ),
        _ => info!(
            scope = REPORT_SCOPE_FAILED_FILES_ONLY,
            "report scope fixed to the only supported value"
        ),
    }
}
