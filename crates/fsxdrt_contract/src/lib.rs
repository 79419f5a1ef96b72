pub mod codec;
pub mod ids;
pub mod model;

pub use codec::{to_canonical_json, CodecError};
pub use ids::{ContractError, FileSystemId, StoragePath, STORAGE_SCHEME};
pub use model::{
    Association, AssociationLifecycle, CallerIdentity, CompletionReport, ObjectSummary,
    ResolvedAssociation, TaskAction, TaskKind, TaskRequest, TaskResponse, TaskStatus,
    REPORT_FORMAT_CSV, REPORT_SCOPE_FAILED_FILES_ONLY,
};
