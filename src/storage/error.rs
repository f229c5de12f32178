//! Storage layer error types
//!
//! All errors that can occur while reading the object store are defined here
//! We use `thiserror` for ergonomic error definition and better error messages

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::InvalidNameError;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// path does not contain a git object store
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    /// the specified branch/ref was not found
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// the commit was not found
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// a tree or blob is missing or corrupt
    #[error("{kind} object not readable: {id}")]
    ObjectNotFound { kind: &'static str, id: String },

    /// a path lookup inside a tree failed
    #[error("path not found in tree: {0}")]
    PathNotFound(String),

    /// the tree entry has an unexpected type
    #[error("unexpected entry type at {path}: expected {expected}, found {found}")]
    UnexpectedEntryType {
        path: String,
        expected: &'static str,
        found: String,
    },

    /// invalid UTF-8 in blob content
    #[error("invalid utf-8 in blob: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// blob holds binary data
    #[error("binary content in blob {0}")]
    BinaryContent(String),

    /// invalid branch name
    #[error("invalid branch name: {0}")]
    InvalidBranchName(#[from] InvalidNameError),
}

impl StorageError {
    /// check if this error indicates the object or ref doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::RefNotFound(_)
                | StorageError::CommitNotFound(_)
                | StorageError::ObjectNotFound { .. }
                | StorageError::PathNotFound(_)
        )
    }

    /// check if this error means the content is not displayable text
    pub fn is_undecodable(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidUtf8(_) | StorageError::BinaryContent(_)
        )
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
