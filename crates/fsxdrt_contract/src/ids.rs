use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STORAGE_SCHEME: &str = "s3://";
const FILE_SYSTEM_ID_PREFIX: &str = "fs-";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("invalid filesystem ID format {0:?}: must start with 'fs-' followed by alphanumeric characters")]
    InvalidFileSystemId(String),
    #[error("invalid storage path {0:?}: expected s3://<bucket>[/<prefix>]")]
    InvalidStoragePath(String),
}

/// Identifier of a managed filesystem, e.g. `fs-0123456789abcdef0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileSystemId(String);

impl FileSystemId {
    pub fn parse(raw: &str) -> Result<Self, ContractError> {
        let candidate = raw.trim();
        let valid = candidate
            .strip_prefix(FILE_SYSTEM_ID_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()));

        if valid {
            Ok(Self(candidate.to_string()))
        } else {
            Err(ContractError::InvalidFileSystemId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileSystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FileSystemId {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FileSystemId> for String {
    fn from(value: FileSystemId) -> Self {
        value.0
    }
}

/// An object-storage location in `s3://bucket/prefix` form.
///
/// The parsed text is kept verbatim, trailing separator included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath {
    raw: String,
    bucket_end: usize,
}

impl StoragePath {
    pub fn parse(raw: &str) -> Result<Self, ContractError> {
        let rest = raw
            .strip_prefix(STORAGE_SCHEME)
            .ok_or_else(|| ContractError::InvalidStoragePath(raw.to_string()))?;
        let bucket_len = rest.find('/').unwrap_or(rest.len());
        if bucket_len == 0 {
            return Err(ContractError::InvalidStoragePath(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            bucket_end: STORAGE_SCHEME.len() + bucket_len,
        })
    }

    pub fn has_scheme(candidate: &str) -> bool {
        candidate.starts_with(STORAGE_SCHEME)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn bucket(&self) -> &str {
        &self.raw[STORAGE_SCHEME.len()..self.bucket_end]
    }

    /// Key prefix below the bucket, without the leading separator.
    pub fn prefix(&self) -> &str {
        self.raw[self.bucket_end..].trim_start_matches('/')
    }

    /// The path with every trailing `/` removed.
    pub fn trimmed(&self) -> &str {
        self.raw.trim_end_matches('/')
    }

    /// Plain concatenation onto the trimmed base; `suffix` carries its own
    /// leading separator.
    pub fn join_suffix(&self, suffix: &str) -> Result<Self, ContractError> {
        Self::parse(&format!("{}{}", self.trimmed(), suffix))
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for StoragePath {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StoragePath> for String {
    fn from(value: StoragePath) -> Self {
        value.raw
    }
}
