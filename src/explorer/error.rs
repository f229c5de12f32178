//! Errors surfaced to callers of [`Explorer`](super::Explorer).
//!
//! Only failures that affect the whole operation end up here. Per-file and
//! per-branch problems are absorbed by the pipelines and show up as
//! placeholders or skipped branches instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Result type for explorer operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

#[derive(Debug, Error)]
pub enum ExplorerError {
    /// no object store at the given path
    #[error("invalid repository: {0}")]
    InvalidRepository(PathBuf),

    /// a branch, commit or revision name that does not resolve
    #[error("unresolvable ref: {0}")]
    UnresolvableRef(String),

    /// a commit or root tree needed by the operation is missing or corrupt
    #[error("object read failure: {0}")]
    ObjectRead(StorageError),
}

impl ExplorerError {
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, ExplorerError::UnresolvableRef(_))
    }
}

impl From<StorageError> for ExplorerError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotARepository(path) => ExplorerError::InvalidRepository(path),
            StorageError::RefNotFound(name) => ExplorerError::UnresolvableRef(name),
            StorageError::InvalidBranchName(e) => ExplorerError::UnresolvableRef(e.to_string()),
            other => ExplorerError::ObjectRead(other),
        }
    }
}
