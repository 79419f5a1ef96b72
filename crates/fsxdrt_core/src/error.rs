use std::collections::BTreeMap;

use fsxdrt_client::ServiceError;
use fsxdrt_contract::FileSystemId;
use thiserror::Error;

pub const DESCRIBE_ASSOCIATIONS: &str = "describe_data_repository_associations";
pub const CREATE_TASK: &str = "create_data_repository_task";
pub const LIST_OBJECTS: &str = "list_objects_v2";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("missing required parameters: {}", .names.join(", "))]
    MissingParameter { names: Vec<&'static str> },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("no data repository associations found for {file_system_id}")]
    NotFound { file_system_id: String },
    #[error(
        "no AVAILABLE data repository associations found for {file_system_id} (states: {})",
        .lifecycles.join(", ")
    )]
    NotAvailable {
        file_system_id: String,
        lifecycles: Vec<String>,
    },
    /// The service rejected the call; displays the service's message as-is.
    #[error("{message}")]
    RemoteService {
        operation: &'static str,
        file_system_id: String,
        code: Option<String>,
        message: String,
        metadata: BTreeMap<String, String>,
    },
    #[error("{operation} for {file_system_id} could not reach the service: {message}")]
    Transport {
        operation: &'static str,
        file_system_id: String,
        message: String,
    },
    #[error("{operation} for {file_system_id} failed unexpectedly: {message}")]
    Unexpected {
        operation: &'static str,
        file_system_id: String,
        message: String,
    },
}

impl TaskError {
    pub fn from_service(
        operation: &'static str,
        file_system_id: &FileSystemId,
        error: ServiceError,
    ) -> Self {
        let file_system_id = file_system_id.to_string();
        match error {
            ServiceError::Api {
                code,
                message,
                metadata,
            } => Self::RemoteService {
                operation,
                file_system_id,
                code,
                message,
                metadata,
            },
            ServiceError::Transport(message) => Self::Transport {
                operation,
                file_system_id,
                message,
            },
            ServiceError::Unexpected(message) => Self::Unexpected {
                operation,
                file_system_id,
                message,
            },
        }
    }

    /// Name of the remote operation that failed, if the failure came from one.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::RemoteService { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Unexpected { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}
